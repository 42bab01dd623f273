//! Static dashboard page and script

use actix_web::http::header::ContentType;
use actix_web::HttpResponse;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const DASHBOARD_JS: &str = include_str!("../../static/dashboard.js");

pub(super) async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

pub(super) async fn script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(DASHBOARD_JS)
}
