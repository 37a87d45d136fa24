use http::{HeaderName, HeaderValue, Response, StatusCode, Version};

use crate::{Error, MAX_RESPONSE_HEADERS};

/// Parse a complete response head (status line and headers, ending `\r\n\r\n`).
pub(crate) fn parse_response_head(input: &[u8]) -> Result<Response<()>, Error> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_RESPONSE_HEADERS];
    let mut res = httparse::Response::new(&mut headers);

    match res.parse(input)? {
        httparse::Status::Complete(_) => {}
        httparse::Status::Partial => return Err(Error::IncompleteHead),
    }

    let version = match res.version {
        Some(0) => Version::HTTP_10,
        Some(1) => Version::HTTP_11,
        _ => return Err(Error::HttpParseFail("unsupported http version".into())),
    };

    // httparse only produces a Complete with a code present.
    let code = res.code.unwrap_or_default();
    let status = StatusCode::from_u16(code)
        .map_err(|_| Error::HttpParseFail(format!("invalid status: {}", code)))?;

    let mut response = Response::new(());
    *response.version_mut() = version;
    *response.status_mut() = status;

    for h in res.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes())
            .map_err(|e| Error::HttpParseFail(e.to_string()))?;
        let value =
            HeaderValue::from_bytes(h.value).map_err(|e| Error::HttpParseFail(e.to_string()))?;
        response.headers_mut().append(name, value);
    }

    Ok(response)
}
