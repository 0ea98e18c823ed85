use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, Error, HttpResponse};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub(crate) status: String,
    pub(crate) message: String,
    pub(crate) code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) list: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) meta: Option<PageMeta>,
}

pub struct JsonResponseBuilder<T> {
    id: Option<i32>,
    item: Option<T>,
    list: Option<Vec<T>>,
    meta: Option<PageMeta>,
}

impl<T> Default for JsonResponseBuilder<T> {
    fn default() -> Self {
        Self {
            id: None,
            item: None,
            list: None,
            meta: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: Serialize,
{
    pub(crate) fn set_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    pub(crate) fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub(crate) fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    pub(crate) fn set_meta(mut self, meta: PageMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    fn into_body(self, status: StatusCode, message: String) -> JsonResponse<T> {
        let status_text = if status.is_success() { "OK" } else { "Error" };
        JsonResponse {
            status: status_text.to_string(),
            message,
            code: status.as_u16(),
            id: self.id,
            item: self.item,
            list: self.list,
            meta: self.meta,
        }
    }

    pub(crate) fn ok<M: Into<String>>(self, msg: M) -> web::Json<JsonResponse<T>> {
        web::Json(self.into_body(StatusCode::OK, msg.into()))
    }

    pub(crate) fn created<M: Into<String>>(self, msg: M) -> HttpResponse {
        HttpResponse::Created().json(self.into_body(StatusCode::CREATED, msg.into()))
    }

    pub(crate) fn accepted<M: Into<String>>(self, msg: M) -> HttpResponse {
        HttpResponse::Accepted().json(self.into_body(StatusCode::ACCEPTED, msg.into()))
    }

    pub(crate) fn bad_request<M: Into<String>>(self, msg: M) -> Error {
        self.error(StatusCode::BAD_REQUEST, msg)
    }

    pub(crate) fn form_error<M: Into<String>>(self, msg: M) -> Error {
        self.error(StatusCode::BAD_REQUEST, msg)
    }

    pub(crate) fn not_found<M: Into<String>>(self, msg: M) -> Error {
        self.error(StatusCode::NOT_FOUND, msg)
    }

    pub(crate) fn error<M: Into<String>>(self, status: StatusCode, msg: M) -> Error {
        let mut message: String = msg.into();
        if message.trim().is_empty() {
            message = status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string();
        }

        let response = HttpResponse::build(status).json(self.into_body(status, message.clone()));
        InternalError::from_response(message, response).into()
    }
}

impl<T> JsonResponse<T>
where
    T: Serialize,
{
    pub(crate) fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder::default()
    }
}

impl JsonResponse<()> {
    /// Bare error body without a payload type, used by error types and middleware.
    pub(crate) fn error_body(status: StatusCode, message: String) -> Self {
        JsonResponse::<()>::build().into_body(status, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn ok_envelope_skips_empty_fields() {
        let body = JsonResponse::build().set_item(42).ok("Found").0;
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["status"], "OK");
        assert_eq!(json["code"], 200);
        assert_eq!(json["message"], "Found");
        assert_eq!(json["item"], 42);
        assert!(json.get("list").is_none());
        assert!(json.get("meta").is_none());
    }

    #[test]
    fn list_envelope_carries_meta() {
        let body = JsonResponse::build()
            .set_list(vec!["a", "b"])
            .set_meta(PageMeta {
                page: 2,
                per_page: 2,
                total: 5,
            })
            .ok("OK")
            .0;
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["list"].as_array().unwrap().len(), 2);
        assert_eq!(json["meta"]["total"], 5);
    }

    #[test]
    fn error_renders_json_with_status() {
        let err = JsonResponse::<()>::build().error(StatusCode::CONFLICT, "Already rated");
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = response.into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "Error");
        assert_eq!(json["code"], 409);
        assert_eq!(json["message"], "Already rated");
    }

    #[test]
    fn empty_error_message_falls_back_to_reason() {
        let err = JsonResponse::<()>::build().not_found("");
        let response = err.error_response();
        let bytes = response.into_body().try_into_bytes().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["message"], "Not Found");
    }
}
