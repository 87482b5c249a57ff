use axum::Router;
use std::path::Path;
use tower_http::services::{ServeDir, ServeFile};

/// Page routes and the template file each one serves
const PAGES: [(&str, &str); 5] = [
    ("/", "priceboard.html"),
    ("/priceboard", "priceboard.html"),
    ("/stock", "stock.html"),
    ("/report", "report.html"),
    ("/analytics", "analytics.html"),
];

/// Static HTML pages plus `/static` assets. Pages are served as stored, without rendering.
pub fn view_routes(templates_dir: &Path, static_dir: &Path) -> Router {
    PAGES
        .iter()
        .fold(Router::new(), |router, (route, file)| {
            router.route_service(route, ServeFile::new(templates_dir.join(file)))
        })
        .nest_service("/static", ServeDir::new(static_dir))
}

/// The information page lives under the JSON prefix.
pub fn information_page(templates_dir: &Path) -> ServeFile {
    ServeFile::new(templates_dir.join("information.html"))
}
