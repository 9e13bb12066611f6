use axum::response::Html;

const UPLOAD_PAGE: &str = include_str!("../../../static/index.html");

pub async fn index_handler() -> Html<&'static str> {
    Html(UPLOAD_PAGE)
}
