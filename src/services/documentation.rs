use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Barako scoreboard.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::match_routes::get_match,
        crate::routes::match_routes::post_event,
        crate::routes::match_routes::post_key,
        crate::routes::match_routes::post_pointer,
        crate::routes::match_routes::bind_player,
        crate::routes::match_routes::reset_match,
        crate::routes::match_routes::get_winner,
        crate::routes::ring_routes::get_ring,
        crate::routes::ring_routes::post_event,
        crate::routes::ring_routes::post_key,
        crate::routes::ring_routes::post_pointer,
        crate::routes::ring_routes::bind_player,
        crate::routes::ring_routes::reset_ring,
        crate::routes::ring_routes::get_winner,
        crate::routes::players::list_players,
        crate::routes::players::create_player,
        crate::routes::players::update_player,
        crate::routes::players::delete_player,
        crate::routes::players::pick_players,
        crate::routes::detection::push_detection,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::scoreboard::MatchSnapshot,
            crate::dto::scoreboard::RingSnapshot,
            crate::dto::scoreboard::SeatSnapshot,
            crate::dto::scoreboard::WinnerView,
            crate::dto::scoreboard::VisiblePhase,
            crate::dto::input::TableCommand,
            crate::dto::input::KeyPress,
            crate::dto::input::InputResponse,
            crate::dto::input::PointerRequest,
            crate::dto::input::PointerTarget,
            crate::dto::input::PointerButton,
            crate::dto::input::BindPlayerRequest,
            crate::dto::roster::PlayerInput,
            crate::dto::roster::RosterResponse,
            crate::dto::detection::DetectionDocument,
            crate::dto::detection::DetectionAccepted,
            crate::state::player::Player,
            crate::state::table::Seat,
            crate::state::rack::GameMode,
            crate::state::ring_engine::DetectionMode,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "match", description = "2-player match scoreboard"),
        (name = "ring", description = "3-player ring game scoreboard"),
        (name = "players", description = "Player roster and picker"),
        (name = "detection", description = "Ball detection feed"),
    )
)]
pub struct ApiDoc;
