#![allow(dead_code)]

use oficina_backend::{build_router, config::AdminSeed, db::Store, AppState, Config};
use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

pub const ADMIN_CPF: &str = "52998224725";
pub const ADMIN_EMAIL: &str = "admin@oficina.com";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

fn test_config() -> Config {
    Config {
        database_url: None,
        jwt_secret: "segredo-dos-testes".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        token_ttl_hours: 1,
        db_max_connections: 1,
        bcrypt_cost: 4,
        admin: Some(AdminSeed {
            cpf: ADMIN_CPF.to_string(),
            nome: "Administrador".to_string(),
            email: ADMIN_EMAIL.to_string(),
            senha: ADMIN_PASSWORD.to_string(),
        }),
    }
}

impl TestServer {
    /// Sobe o mesmo router de produção, com armazenamento em memória e
    /// um administrador semeado, numa porta efêmera.
    pub async fn spawn() -> Self {
        let config = test_config();
        let app_state = AppState::with_store(Store::in_memory(), &config)
            .await
            .expect("failed to build app state");
        let app = build_router(app_state);

        let listener = tokio::net::TcpListener::bind(&config.bind_addr)
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, email: &str, senha: &str) -> Response {
        self.client
            .post(self.url("/api/usuarios/login"))
            .json(&json!({ "email": email, "senha": senha }))
            .send()
            .await
            .unwrap()
    }

    pub async fn token(&self, email: &str, senha: &str) -> String {
        let res = self.login(email, senha).await;
        assert_eq!(res.status(), StatusCode::OK, "login de {email} falhou");
        let body: Value = res.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Cria um usuário com a função dada (via admin) e devolve o token dele.
    pub async fn user_token(&self, admin: &str, cpf: &str, funcao: &str) -> String {
        let email = format!("{cpf}@oficina.com");
        let res = self
            .post(
                admin,
                "/api/usuarios",
                json!({
                    "cpf": cpf,
                    "nome": format!("Usuário {funcao}"),
                    "email": email,
                    "funcao": funcao,
                    "senha": "senha123",
                }),
            )
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        self.token(&email, "senha123").await
    }

    pub async fn get(&self, token: &str, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    pub async fn post(&self, token: &str, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn put(&self, token: &str, path: &str, body: Value) -> Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete(&self, token: &str, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn client_body(cpf: &str, email: &str) -> Value {
    json!({
        "cpf": cpf,
        "nome": "Maria Oliveira",
        "sexo": "F",
        "telefone": "11987654321",
        "email": email,
    })
}

pub fn motorcycle_body(placa: &str, marca_id: i64, cliente_cpf: &str) -> Value {
    json!({
        "placa": placa,
        "modelo": "CG 160 Fan",
        "cor": "Vermelha",
        "ano": 2022,
        "marca_id": marca_id,
        "cliente_cpf": cliente_cpf,
    })
}
