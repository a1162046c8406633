use actix_web::{
    body::MessageBody,
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use log::debug;

/// Posts `body` as JSON to `path`, with any extra headers. Errors raised by middleware come back as `Err`, with the
/// error message.
pub async fn post_request<F>(
    path: &str,
    headers: &[(&str, &str)],
    body: &str,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let mut req = TestRequest::post().uri(path).insert_header(ContentType::json());
    for (name, value) in headers {
        req = req.insert_header((*name, *value));
    }
    let req = req.set_payload(body.to_string()).to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request to {path}");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
