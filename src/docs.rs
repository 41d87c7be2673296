use crate::common::response::ErrorBody;
use crate::modules::caption::dto::CaptionizeForm;
use crate::modules::health::dto::HealthResponse;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::handler::health_check,
        crate::modules::caption::handler::captionize,
    ),
    components(schemas(CaptionizeForm, ErrorBody, HealthResponse)),
    tags(
        (name = "Captions", description = "Subtitle burn-in via FFmpeg"),
        (name = "System", description = "Service status")
    )
)]
pub struct ApiDoc;
