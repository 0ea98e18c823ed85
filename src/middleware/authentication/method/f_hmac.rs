use crate::configuration::Settings;
use crate::middleware::authentication::get_header;
use crate::services::ServiceError;
use actix_web::{dev::ServiceRequest, web, HttpMessage};
use futures::StreamExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub const SIGNATURE_HEADER: &str = "x-bot-signature";
const MAX_PREALLOCATED_BODY: usize = 64 * 1024;

/// Marker left in request extensions once the body signature of the
/// companion bot has been verified.
#[derive(Debug, Clone, Copy)]
pub struct BotCaller;

/// Hex HMAC-SHA256 of `body` keyed by `secret`.
pub fn sign_body(secret: &[u8], body: &[u8]) -> Result<String, String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(|err| {
        tracing::error!("error generating hmac {err:?}");
        "can't create hmac".to_string()
    })?;
    mac.update(body);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Checks a hex signature against the body in constant time.
pub fn verify_body(secret: &[u8], body: &[u8], signature: &str) -> Result<bool, String> {
    let expected = match hex::decode(signature.trim()) {
        Ok(expected) => expected,
        Err(_) => return Ok(false),
    };
    let mut mac = Hmac::<Sha256>::new_from_slice(secret).map_err(|err| {
        tracing::error!("error generating hmac {err:?}");
        "can't create hmac".to_string()
    })?;
    mac.update(body);
    Ok(mac.verify_slice(&expected).is_ok())
}

/// Drains the payload and puts it back for the handler.
async fn read_body(req: &mut ServiceRequest) -> Result<web::Bytes, String> {
    let content_length: usize = get_header(req, "content-length")?.unwrap_or_default();
    let mut body = web::BytesMut::with_capacity(content_length.min(MAX_PREALLOCATED_BODY));
    let mut payload = req.take_payload();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|err| format!("can't read the body {err}"))?;
        body.extend_from_slice(&chunk);
    }
    let body = body.freeze();

    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body.clone());
    req.set_payload(payload.into());

    Ok(body)
}

#[tracing::instrument(name = "Authenticate bot signature", skip(req))]
pub async fn try_bot(req: &mut ServiceRequest) -> Result<bool, ServiceError> {
    let header_hash = get_header::<String>(req, SIGNATURE_HEADER)
        .map_err(ServiceError::Unauthorized)?;
    let header_hash = match header_hash {
        Some(hash) => hash,
        None => return Ok(false),
    };

    let secret = req
        .app_data::<web::Data<Settings>>()
        .map(|settings| settings.telegram.bot_secret.clone())
        .unwrap_or_default();
    if secret.is_empty() {
        tracing::warn!("Bot signature received but no bot secret is configured");
        return Err(ServiceError::Unauthorized("Bot is not configured".to_string()));
    }

    let body = read_body(req).await.map_err(ServiceError::Unauthorized)?;
    let verified = verify_body(secret.as_bytes(), &body, &header_hash)
        .map_err(ServiceError::Unauthorized)?;
    if !verified {
        return Err(ServiceError::Unauthorized("Bot signature is wrong".to_string()));
    }

    req.extensions_mut().insert(BotCaller);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_is_lowercase_hex_sha256() {
        let signature = sign_body(b"secret", b"{\"token\":\"abc\"}").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(signature, sign_body(b"secret", b"{\"token\":\"abc\"}").unwrap());
        assert_ne!(signature, sign_body(b"other", b"{\"token\":\"abc\"}").unwrap());
    }

    #[test]
    fn verification_accepts_only_the_matching_signature() {
        let body = b"{\"token\":\"abc\"}";
        let signature = sign_body(b"secret", body).unwrap();

        assert!(verify_body(b"secret", body, &signature).unwrap());
        assert!(verify_body(b"secret", body, &signature.to_uppercase()).unwrap());
        assert!(!verify_body(b"other", body, &signature).unwrap());
        assert!(!verify_body(b"secret", b"{}", &signature).unwrap());
        assert!(!verify_body(b"secret", body, "not-hex").unwrap());
        assert!(!verify_body(b"secret", body, &signature[..32]).unwrap());
    }
}
