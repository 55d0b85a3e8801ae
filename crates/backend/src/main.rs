pub mod dashboards;
pub mod handlers;
pub mod shared;
pub mod system;
pub mod upstream;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::body::Body;
    use axum::http::{header, Method, Request};
    use axum::middleware::{self, Next};
    use axum::response::Response;
    use axum::{
        routing::{get, post},
        Router,
    };
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::services::ServeDir;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::Path::new("target").join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    // Request log line: timestamp | duration | body size | status method path
    async fn request_logger(req: Request<Body>, next: Next) -> Response {
        use axum::body::to_bytes;
        use chrono::Utc;
        use contracts::shared::date_range::ist_offset;

        let start = std::time::Instant::now();
        let method = req.method().clone();
        let uri = req.uri().clone();

        let response = next.run(req).await;

        let (parts, body) = response.into_parts();

        // Read the response body to learn its real size
        let bytes = match to_bytes(body, usize::MAX).await {
            Ok(b) => b,
            Err(_) => {
                let duration = start.elapsed();
                let timestamp = Utc::now().with_timezone(&ist_offset());
                println!(
                    "\x1b[33m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
                    timestamp.format("%H:%M:%S"),
                    duration.as_millis(),
                    "error",
                    parts.status.as_u16(),
                    method,
                    uri.path()
                );
                return Response::from_parts(parts, Body::default());
            }
        };

        let size = bytes.len();
        let duration = start.elapsed();
        let timestamp = Utc::now().with_timezone(&ist_offset());

        // Cyan for 200, brown for everything else
        let color_code = if parts.status.as_u16() == 200 {
            "36"
        } else {
            "33"
        };

        println!(
            "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
            color_code,
            timestamp.format("%H:%M:%S"),
            duration.as_millis(),
            shared::format::indian_int(size as i64),
            parts.status.as_u16(),
            method,
            uri.path()
        );

        // Rebuild the response with the body we consumed
        Response::from_parts(parts, Body::from(bytes))
    }

    // Load config (config.toml next to the binary, env overrides)
    let config = shared::config::load_config()?;

    // Initialize the upstream HTTP client
    upstream::client::initialize_client(&config.upstream)?;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // SYSTEM AUTH ROUTES (PUBLIC)
        // ========================================
        .route("/api/auth/login", post(system::handlers::auth::login))
        .route("/api/auth/logout", post(system::handlers::auth::logout))
        // System auth routes (protected)
        .route(
            "/api/auth/me",
            get(system::handlers::auth::current_employee).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        // ========================================
        // DASHBOARD ROUTES (protected)
        // ========================================
        .route(
            "/api/d100/disbursal-summary",
            get(handlers::d100_disbursal_summary::get_disbursal_summary).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        .route(
            "/api/d100/disbursal-records",
            get(handlers::d100_disbursal_summary::get_disbursal_records).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        .route(
            "/api/d100/prepayment-records",
            get(handlers::d100_disbursal_summary::get_prepayment_records).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        .route(
            "/api/d100/on-time-records",
            get(handlers::d100_disbursal_summary::get_on_time_records).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        .route(
            "/api/d100/overdue-records",
            get(handlers::d100_disbursal_summary::get_overdue_records).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        .route(
            "/api/d101/collection-summary",
            get(handlers::d101_collection_summary::get_collection_summary).layer(
                middleware::from_fn(system::auth::middleware::require_session),
            ),
        )
        .route(
            "/api/d102/aum-report",
            get(handlers::d102_aum_report::get_aum_report).layer(middleware::from_fn(
                system::auth::middleware::require_session,
            )),
        )
        .fallback_service(ServeDir::new("dist"))
        .layer(middleware::from_fn(request_logger))
        .layer(cors);

    let addr: SocketAddr = config
        .server
        .bind_addr
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind_addr {:?}: {}", config.server.bind_addr, e))?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: {} is already in use. Please ensure no other process is using this port.",
                    addr
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            // Propagate the error to stop the application
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
