// src/routes.rs

use axum::{
    middleware,
    routing::{delete, get, post, put, MethodRouter},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::AppState,
    handlers::{self, resource},
    middleware::{
        auth::auth_guard,
        roles::{role_guard, RoleGate},
    },
    models::{
        acquisition::Acquisition, brand::Brand, budget::Budget, client::Client,
        motorcycle::Motorcycle, part::Part, resource::Resource, service_order::ServiceOrder,
        supplier::Supplier, user::{Role, User},
    },
};

const EVERYONE: &[Role] = Role::ALL;
const ADMIN: &[Role] = &[Role::Administrador];
const OFFICE: &[Role] = &[Role::Administrador, Role::Secretaria];
const FRONT_DESK: &[Role] = &[Role::Administrador, Role::Secretaria, Role::Atendente];

/// Quem pode ler, gravar (POST/PUT) e excluir numa coleção.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    pub read: &'static [Role],
    pub write: &'static [Role],
    pub delete: &'static [Role],
}

/// As coleções com CRUD completo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clientes,
    Usuarios,
    Motocicletas,
    Marcas,
    Fornecedores,
    Pecas,
    Ordens,
    Orcamentos,
    Aquisicoes,
}

impl Collection {
    pub const ALL: [Collection; 9] = [
        Collection::Clientes,
        Collection::Usuarios,
        Collection::Motocicletas,
        Collection::Marcas,
        Collection::Fornecedores,
        Collection::Pecas,
        Collection::Ordens,
        Collection::Orcamentos,
        Collection::Aquisicoes,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Collection::Clientes => "/api/clientes",
            Collection::Usuarios => "/api/usuarios",
            Collection::Motocicletas => "/api/motocicletas",
            Collection::Marcas => "/api/marcas",
            Collection::Fornecedores => "/api/fornecedores",
            Collection::Pecas => "/api/pecas",
            Collection::Ordens => "/api/ordens",
            Collection::Orcamentos => "/api/orcamentos",
            Collection::Aquisicoes => "/api/aquisicoes",
        }
    }

    pub fn policy(&self) -> AccessPolicy {
        let (read, write) = match self {
            Collection::Clientes | Collection::Motocicletas | Collection::Orcamentos => {
                (EVERYONE, FRONT_DESK)
            }
            Collection::Usuarios => (ADMIN, ADMIN),
            Collection::Marcas | Collection::Pecas => (EVERYONE, OFFICE),
            Collection::Fornecedores | Collection::Aquisicoes => (OFFICE, OFFICE),
            Collection::Ordens => (EVERYONE, EVERYONE),
        };
        AccessPolicy {
            read,
            write,
            delete: ADMIN,
        }
    }

    fn router(&self) -> Router<AppState> {
        match self {
            Collection::Clientes => crud::<Client>(*self),
            Collection::Usuarios => crud::<User>(*self),
            Collection::Motocicletas => crud::<Motorcycle>(*self),
            Collection::Marcas => crud::<Brand>(*self),
            Collection::Fornecedores => crud::<Supplier>(*self),
            Collection::Pecas => crud::<Part>(*self),
            Collection::Ordens => crud::<ServiceOrder>(*self),
            Collection::Orcamentos => crud::<Budget>(*self),
            Collection::Aquisicoes => crud::<Acquisition>(*self),
        }
    }
}

// Aplica o Role Gate a um método da rota
fn guarded(route: MethodRouter<AppState>, roles: &'static [Role]) -> MethodRouter<AppState> {
    route.route_layer(middleware::from_fn_with_state(RoleGate::new(roles), role_guard))
}

fn crud<R: Resource>(collection: Collection) -> Router<AppState> {
    let path = collection.path();
    let policy = collection.policy();

    Router::new()
        .route(
            path,
            guarded(get(resource::list::<R>), policy.read)
                .merge(guarded(post(resource::create::<R>), policy.write)),
        )
        .route(
            &format!("{path}/{{key}}"),
            guarded(get(resource::find_one::<R>), policy.read)
                .merge(guarded(put(resource::update::<R>), policy.write))
                .merge(guarded(delete(resource::remove::<R>), policy.delete)),
        )
}

pub fn build_router(app_state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/health", get(handlers::health::health))
        .route("/api/usuarios/login", post(handlers::auth::login));

    let special_routes = Router::new()
        .route("/api/usuarios/me", get(handlers::auth::me))
        .route(
            "/api/usuarios/mecanicos",
            guarded(get(handlers::auth::mechanics), EVERYONE),
        )
        .route(
            "/api/clientes/check-email",
            guarded(
                post(handlers::clients::check_email),
                Collection::Clientes.policy().write,
            ),
        )
        .route(
            "/api/motocicletas/cliente/{cpf}",
            guarded(
                get(handlers::motorcycles::by_client),
                Collection::Motocicletas.policy().read,
            ),
        )
        .route("/api/dashboard/stats", guarded(get(handlers::dashboard::stats), OFFICE))
        .route("/api/dashboard/charts", guarded(get(handlers::dashboard::charts), OFFICE))
        .route(
            "/api/dashboard/recent-orders",
            guarded(get(handlers::dashboard::recent_orders), OFFICE),
        );

    let protected_routes = Collection::ALL
        .iter()
        .fold(special_routes, |router, collection| router.merge(collection.router()))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_guard));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
