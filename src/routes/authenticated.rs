use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Nested under `/protected` behind the session middleware. Every handler also takes the
/// `Session` extractor, which reuses the session the middleware already validated.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /protected
        .route("/", get(handlers::dashboard::protected_home))
        // --- Dashboards (one per role family) ---
        .route(
            "/dashboard/pengunjung",
            get(handlers::dashboard::dashboard_pengunjung),
        )
        .route(
            "/dashboard/dokter-hewan",
            get(handlers::dashboard::dashboard_dokter_hewan),
        )
        .route(
            "/dashboard/penjaga-hewan",
            get(handlers::dashboard::dashboard_penjaga_hewan),
        )
        .route(
            "/dashboard/staf-administrasi",
            get(handlers::dashboard::dashboard_staf_administrasi),
        )
        .route(
            "/dashboard/staf-pelatih",
            get(handlers::dashboard::dashboard_staf_pelatih),
        )
        // --- Own profile ---
        .route(
            "/profil",
            get(handlers::dashboard::get_profile).put(handlers::dashboard::update_profile),
        )
        .route("/profil/password", put(handlers::dashboard::change_password))
        // --- Animals (read-only, any role) ---
        .route("/hewan", get(handlers::care::list_animals))
        .route("/hewan/{id}", get(handlers::care::get_animal))
        // --- Visitor reservations ---
        .route(
            "/reservasi",
            get(handlers::visits::list_my_reservations).post(handlers::visits::create_reservation),
        )
        .route(
            "/reservasi/{fasilitas}/{tanggal}",
            put(handlers::visits::update_my_reservation),
        )
        .route(
            "/reservasi/{fasilitas}/{tanggal}/batal",
            post(handlers::visits::cancel_my_reservation),
        )
        // GET /protected/adopsi-saya (adopter)
        .route("/adopsi-saya", get(handlers::visits::my_adoptions))
        // GET /protected/jadwal-pertunjukan (trainer)
        .route(
            "/jadwal-pertunjukan",
            get(handlers::visits::my_show_schedule),
        )
}
