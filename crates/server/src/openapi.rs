use common::types::Health;
use utoipa::OpenApi;

use crate::errors::ErrorBody;
use crate::routes::items::ValueBody;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::items::read_value,
        crate::routes::items::create_value,
        crate::routes::items::update_value,
        crate::routes::items::delete_value,
    ),
    components(
        schemas(
            Health,
            ValueBody,
            ErrorBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "items")
    )
)]
pub struct ApiDoc;
