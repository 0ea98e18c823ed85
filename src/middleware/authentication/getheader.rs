use actix_web::{dev::ServiceRequest, http::header::HeaderName};
use std::str::FromStr;

pub fn get_header<T>(req: &ServiceRequest, header_name: &'static str) -> Result<Option<T>, String>
where
    T: FromStr,
{
    let header_value = match req.headers().get(HeaderName::from_static(header_name)) {
        Some(value) => value,
        None => return Ok(None),
    };

    header_value
        .to_str()
        .map_err(|_| format!("header {header_name} can't be converted to string"))?
        .parse::<T>()
        .map_err(|_| format!("header {header_name} has wrong type"))
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn parses_present_header() {
        let req = TestRequest::default()
            .insert_header(("content-length", "42"))
            .to_srv_request();
        assert_eq!(get_header::<usize>(&req, "content-length"), Ok(Some(42)));
    }

    #[test]
    fn missing_header_is_none() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(get_header::<String>(&req, "authorization"), Ok(None));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let req = TestRequest::default()
            .insert_header(("content-length", "many"))
            .to_srv_request();
        assert!(get_header::<usize>(&req, "content-length").is_err());
    }
}
