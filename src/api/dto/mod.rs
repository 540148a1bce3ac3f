pub mod health;
pub mod links;

pub use health::HealthResponse;
pub use links::{
    CreateLinkRequest, CreateLinkResponse, LinkDetail, ListLinksParams, UpdateLinkRequest,
};
