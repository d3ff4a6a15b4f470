/// Ball detection bridge feeding the ring game.
pub mod detection_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Keyboard shortcuts of the scoreboard pages.
pub mod keymap;
/// 2-player match operations.
pub mod match_service;
/// 3-player ring game operations.
pub mod ring_service;
/// Player roster and picker.
pub mod roster_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
