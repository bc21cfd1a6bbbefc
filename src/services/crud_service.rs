// src/services/crud_service.rs

use crate::{
    common::error::AppError,
    db::Store,
    models::resource::{KeyKind, Resource, WriteContext},
};

/// As regras comuns de criação, leitura, atualização e exclusão.
/// Cada entidade entra só com o que a diferencia (ver `Resource`).
#[derive(Clone)]
pub struct CrudService {
    store: Store,
    ctx: WriteContext,
}

impl CrudService {
    pub fn new(store: Store, ctx: WriteContext) -> Self {
        Self { store, ctx }
    }

    pub async fn create<R: Resource>(&self, payload: R::Create) -> Result<R, AppError> {
        let record = R::from_create(payload, &self.ctx).await?;

        if R::KEY_KIND == KeyKind::Natural
            && R::repository(&self.store).find(&record.key()).await?.is_some()
        {
            return Err(AppError::Conflict(format!(
                "{} já cadastrado(a) com a chave '{}'.",
                R::LABEL,
                record.key()
            )));
        }

        record.check_integrity(&self.store, None).await?;
        let created = R::repository(&self.store).insert(record).await?;

        tracing::info!("📝 {} criado(a): {}", R::LABEL, created.key());
        Ok(created)
    }

    pub async fn list<R: Resource>(&self) -> Result<Vec<R>, AppError> {
        R::repository(&self.store).list().await
    }

    pub async fn find<R: Resource>(&self, raw_key: &str) -> Result<R, AppError> {
        let key = R::normalize_key(raw_key);
        R::repository(&self.store)
            .find(&key)
            .await?
            .ok_or_else(|| AppError::NotFound(R::NOT_FOUND.to_string()))
    }

    pub async fn find_by<R: Resource>(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<Vec<R>, AppError> {
        R::repository(&self.store).find_by(field, value).await
    }

    /// Atualização parcial. A chave nunca muda.
    pub async fn update<R: Resource>(&self, raw_key: &str, patch: R::Update) -> Result<R, AppError> {
        let key = R::normalize_key(raw_key);
        let before = self.find::<R>(&key).await?;
        let mut record = before.clone();

        record.apply_update(patch, &self.ctx).await?;
        record.check_integrity(&self.store, Some(&before)).await?;

        let updated = R::repository(&self.store)
            .update(&key, record)
            .await?
            .ok_or_else(|| AppError::NotFound(R::NOT_FOUND.to_string()))?;

        tracing::info!("✏️ {} atualizado(a): {}", R::LABEL, key);
        Ok(updated)
    }

    pub async fn delete<R: Resource>(&self, raw_key: &str) -> Result<(), AppError> {
        let key = R::normalize_key(raw_key);
        let repo = R::repository(&self.store);

        if repo.find(&key).await?.is_none() {
            return Err(AppError::NotFound(R::NOT_FOUND.to_string()));
        }

        R::check_dependents(&key, &self.store).await?;

        if !repo.delete(&key).await? {
            return Err(AppError::NotFound(R::NOT_FOUND.to_string()));
        }

        tracing::info!("🗑️ {} removido(a): {}", R::LABEL, key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            brand::{Brand, CreateBrandPayload, UpdateBrandPayload},
            budget::Budget,
            client::{Client, CreateClientPayload, Sexo},
            motorcycle::{CreateMotorcyclePayload, Motorcycle, UpdateMotorcyclePayload},
            part::Part,
            service_order::ServiceOrder,
        },
        services::auth::PasswordHasher,
    };
    use serde_json::json;

    fn service() -> CrudService {
        CrudService::new(Store::in_memory(), WriteContext::new(PasswordHasher::new(4)))
    }

    fn client_payload(cpf: &str, email: &str) -> CreateClientPayload {
        CreateClientPayload {
            cpf: cpf.into(),
            nome: "Ana Souza".into(),
            sexo: Sexo::F,
            endereco: None,
            telefone: "11988887777".into(),
            email: email.into(),
            profissao: None,
            data_nascimento: None,
        }
    }

    fn moto_payload(placa: &str, marca_id: i64, cliente_cpf: &str) -> CreateMotorcyclePayload {
        CreateMotorcyclePayload {
            placa: placa.into(),
            modelo: "CG 160".into(),
            cor: "Vermelha".into(),
            ano: 2022,
            quilometragem: Some(1500),
            marca_id,
            cliente_cpf: cliente_cpf.into(),
            status: None,
        }
    }

    #[tokio::test]
    async fn brand_lifecycle() {
        let service = service();

        let honda = service
            .create::<Brand>(CreateBrandPayload { nome: "Honda".into() })
            .await
            .unwrap();
        assert_eq!(honda, Brand { id: 1, nome: "Honda".into() });

        let renamed = service
            .update::<Brand>("1", UpdateBrandPayload { nome: Some("Honda Motos".into()) })
            .await
            .unwrap();
        assert_eq!(renamed.nome, "Honda Motos");

        service.delete::<Brand>("1").await.unwrap();
        let err = service.find::<Brand>("1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_keys_are_not_found() {
        let service = service();
        assert!(matches!(
            service.update::<Brand>("42", UpdateBrandPayload { nome: None }).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(service.delete::<Brand>("42").await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn brand_with_motorcycles_cannot_be_deleted() {
        let service = service();
        service.create::<Brand>(CreateBrandPayload { nome: "Yamaha".into() }).await.unwrap();
        service
            .create::<Client>(client_payload("529.982.247-25", "ana@email.com"))
            .await
            .unwrap();
        service
            .create::<Motorcycle>(moto_payload("abc-1234", 1, "52998224725"))
            .await
            .unwrap();

        match service.delete::<Brand>("1").await {
            Err(AppError::Conflict(message)) => {
                assert!(message.contains("possui motocicletas vinculadas"))
            }
            other => panic!("esperado conflito, veio {other:?}"),
        }
    }

    #[tokio::test]
    async fn dangling_reference_is_rejected() {
        let service = service();
        let err = service
            .create::<Motorcycle>(moto_payload("ABC1234", 9, "52998224725"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn duplicate_natural_key_and_masked_lookup() {
        let service = service();
        service
            .create::<Client>(client_payload("52998224725", "ana@email.com"))
            .await
            .unwrap();

        let err = service
            .create::<Client>(client_payload("529.982.247-25", "outra@email.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let found = service.find::<Client>("529.982.247-25").await.unwrap();
        assert_eq!(found.email, "ana@email.com");
    }

    #[tokio::test]
    async fn stale_reference_does_not_block_unrelated_updates() {
        let service = service();
        service.create::<Brand>(CreateBrandPayload { nome: "Honda".into() }).await.unwrap();
        service
            .create::<Client>(client_payload("52998224725", "ana@email.com"))
            .await
            .unwrap();
        service
            .create::<Client>(client_payload("11144477735", "bia@email.com"))
            .await
            .unwrap();
        service
            .create::<Motorcycle>(moto_payload("ABC1234", 1, "52998224725"))
            .await
            .unwrap();
        service
            .create::<ServiceOrder>(
                serde_json::from_value(json!({
                    "titulo": "Revisão",
                    "cliente_cpf": "52998224725",
                    "motocicleta_placa": "ABC1234"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        // A moto troca de dono depois da ordem aberta
        let moved = UpdateMotorcyclePayload {
            modelo: None,
            cor: None,
            ano: None,
            quilometragem: None,
            marca_id: None,
            cliente_cpf: Some("11144477735".into()),
            status: None,
        };
        service.update::<Motorcycle>("ABC1234", moved).await.unwrap();

        let updated = service
            .update::<ServiceOrder>(
                "1",
                serde_json::from_value(json!({ "status": "Concluída" })).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, "Concluída");

        // Trocar o cliente da ordem volta a conferir a posse da moto
        service
            .update::<ServiceOrder>(
                "1",
                serde_json::from_value(json!({ "cliente_cpf": "11144477735" })).unwrap(),
            )
            .await
            .unwrap();
        let err = service
            .update::<ServiceOrder>(
                "1",
                serde_json::from_value(json!({ "cliente_cpf": "52998224725" })).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn part_quoted_in_a_budget_cannot_be_deleted() {
        let service = service();
        service
            .create::<Client>(client_payload("52998224725", "ana@email.com"))
            .await
            .unwrap();
        service
            .create::<Part>(
                serde_json::from_value(json!({ "nome": "Pastilha de freio", "valor": 45.5 })).unwrap(),
            )
            .await
            .unwrap();
        service
            .create::<Budget>(
                serde_json::from_value(json!({
                    "validade": "2026-12-31",
                    "cliente_cpf": "52998224725",
                    "itens": [{
                        "tipo": "peca",
                        "descricao": "Pastilha",
                        "quantidade": 2,
                        "valorUnitario": 45.5,
                        "pecaId": 1
                    }]
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        match service.delete::<Part>("1").await {
            Err(AppError::Conflict(message)) => assert!(message.contains("orçamentos")),
            other => panic!("esperado conflito, veio {other:?}"),
        }

        // Sem o item, a peça fica livre
        service
            .update::<Budget>(
                "1",
                serde_json::from_value(json!({ "itens": [], "valor": 10 })).unwrap(),
            )
            .await
            .unwrap();
        service.delete::<Part>("1").await.unwrap();
    }
}
