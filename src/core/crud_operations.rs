/// Stamp out documented Axum handlers and an `OpenApiRouter` for one resource.
///
/// ```rust,ignore
/// crate::crud_handlers!(Vehicle, VehiclePayload, "vehicles", "/vehicles/", "/vehicles/{id}");
/// ```
///
/// The handlers delegate to the generic functions in [`crate::routes`]; the
/// wrappers only exist so each resource gets its own `utoipa` path metadata.
#[macro_export]
macro_rules! crud_handlers {
    ($resource:ty, $payload:ty, $tag:literal, $collection:literal, $item:literal) => {
        #[utoipa::path(
            get,
            path = $collection,
            tag = $tag,
            responses(
                (status = axum::http::StatusCode::OK, description = "Matching records, narrowed by ?field=value filters", body = [$resource]),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "A filter value does not fit its field's type")
            ),
            operation_id = concat!("list_", $tag),
            summary = "List records",
            description = "Returns all records. Query parameters naming a filterable field narrow the result by equality; unknown parameters are ignored."
        )]
        pub async fn get_all_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            query: axum::extract::Query<std::collections::HashMap<String, String>>,
        ) -> Result<axum::Json<Vec<$resource>>, $crate::errors::ApiError> {
            $crate::routes::get_all::<$resource>(state, query).await
        }

        #[utoipa::path(
            get,
            path = $item,
            tag = $tag,
            params(("id" = uuid::Uuid, Path, description = "Record id")),
            responses(
                (status = axum::http::StatusCode::OK, description = "The requested record", body = $resource),
                (status = axum::http::StatusCode::NOT_FOUND, description = "No record with this id, or the id is not a UUID")
            ),
            operation_id = concat!("get_", $tag),
            summary = "Get one record"
        )]
        pub async fn get_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<uuid::Uuid>, axum::extract::rejection::PathRejection>,
        ) -> Result<axum::Json<$resource>, $crate::errors::ApiError> {
            $crate::routes::get_one::<$resource>(state, path).await
        }

        #[utoipa::path(
            post,
            path = $collection,
            tag = $tag,
            request_body = $payload,
            responses(
                (status = axum::http::StatusCode::CREATED, description = "Record created", body = $resource),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Malformed body or per-field validation errors")
            ),
            operation_id = concat!("create_", $tag),
            summary = "Create a record"
        )]
        pub async fn create_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            payload: Result<axum::Json<$payload>, axum::extract::rejection::JsonRejection>,
        ) -> Result<(axum::http::StatusCode, axum::Json<$resource>), $crate::errors::ApiError> {
            $crate::routes::create_one::<$resource>(state, payload).await
        }

        #[utoipa::path(
            put,
            path = $item,
            tag = $tag,
            params(("id" = uuid::Uuid, Path, description = "Record id")),
            request_body = $payload,
            responses(
                (status = axum::http::StatusCode::OK, description = "Record replaced", body = $resource),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Malformed body or per-field validation errors"),
                (status = axum::http::StatusCode::NOT_FOUND, description = "No record with this id, or the id is not a UUID")
            ),
            operation_id = concat!("replace_", $tag),
            summary = "Replace a record"
        )]
        pub async fn replace_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<uuid::Uuid>, axum::extract::rejection::PathRejection>,
            payload: Result<axum::Json<$payload>, axum::extract::rejection::JsonRejection>,
        ) -> Result<axum::Json<$resource>, $crate::errors::ApiError> {
            $crate::routes::replace_one::<$resource>(state, path, payload).await
        }

        #[utoipa::path(
            patch,
            path = $item,
            tag = $tag,
            params(("id" = uuid::Uuid, Path, description = "Record id")),
            request_body = $payload,
            responses(
                (status = axum::http::StatusCode::OK, description = "Record updated", body = $resource),
                (status = axum::http::StatusCode::BAD_REQUEST, description = "Malformed body or per-field validation errors"),
                (status = axum::http::StatusCode::NOT_FOUND, description = "No record with this id, or the id is not a UUID")
            ),
            operation_id = concat!("update_", $tag),
            summary = "Partially update a record"
        )]
        pub async fn update_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<uuid::Uuid>, axum::extract::rejection::PathRejection>,
            payload: Result<axum::Json<$payload>, axum::extract::rejection::JsonRejection>,
        ) -> Result<axum::Json<$resource>, $crate::errors::ApiError> {
            $crate::routes::update_one::<$resource>(state, path, payload).await
        }

        #[utoipa::path(
            delete,
            path = $item,
            tag = $tag,
            params(("id" = uuid::Uuid, Path, description = "Record id")),
            responses(
                (status = axum::http::StatusCode::NO_CONTENT, description = "Record deleted"),
                (status = axum::http::StatusCode::NOT_FOUND, description = "No record with this id, or the id is not a UUID"),
                (status = axum::http::StatusCode::CONFLICT, description = "Other records still reference this one")
            ),
            operation_id = concat!("delete_", $tag),
            summary = "Delete a record"
        )]
        pub async fn delete_one_handler(
            state: axum::extract::State<sea_orm::DatabaseConnection>,
            path: Result<axum::extract::Path<uuid::Uuid>, axum::extract::rejection::PathRejection>,
        ) -> Result<axum::http::StatusCode, $crate::errors::ApiError> {
            $crate::routes::delete_one::<$resource>(state, path).await
        }

        /// Routes for this resource, with OpenAPI metadata attached.
        pub fn router() -> utoipa_axum::router::OpenApiRouter<sea_orm::DatabaseConnection> {
            use utoipa_axum::routes;

            utoipa_axum::router::OpenApiRouter::new()
                .routes(routes!(get_all_handler))
                .routes(routes!(create_one_handler))
                .routes(routes!(get_one_handler))
                .routes(routes!(replace_one_handler))
                .routes(routes!(update_one_handler))
                .routes(routes!(delete_one_handler))
                .route(
                    $collection,
                    axum::routing::put($crate::routes::missing_id)
                        .patch($crate::routes::missing_id)
                        .delete($crate::routes::missing_id),
                )
        }
    };
}
