// src/models/budget.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    common::{documents, error::AppError},
    db::{Repository, Store},
    models::{
        client::Client,
        part::Part,
        resource::{
            amount_overflow, changed, clean_optional, ensure_exists, validate_amount,
            validate_not_blank, validate_quantity, within_limit, KeyKind, Resource, WriteContext,
        },
        service_order::ServiceOrder,
    },
};

/// P = pendente, A = aprovado, R = reprovado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub enum BudgetStatus {
    #[default]
    P,
    A,
    R,
}

impl BudgetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            BudgetStatus::P => "Pendente",
            BudgetStatus::A => "Aprovado",
            BudgetStatus::R => "Reprovado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Peca,
    Servico,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub tipo: ItemKind,
    pub descricao: String,
    pub quantidade: Decimal,
    pub valor_unitario: Decimal,
    // Sempre recalculado: quantidade × valorUnitario
    #[serde(default)]
    pub valor_total: Decimal,
    pub peca_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: i64,
    pub valor: Decimal,
    pub validade: NaiveDate,
    pub status: BudgetStatus,
    pub descricao: Option<String>,
    pub ordem_servico_cod: Option<i64>,
    pub cliente_cpf: String,
    pub itens: Vec<BudgetItem>,
}

impl Budget {
    /// Recalcula o total de cada item e, havendo itens, o valor do orçamento.
    /// Totais acima de `MAX_AMOUNT` viram 400.
    pub fn recalculate(&mut self) -> Result<(), AppError> {
        for item in &mut self.itens {
            let total = item
                .quantidade
                .checked_mul(item.valor_unitario)
                .ok_or_else(amount_overflow)?;
            item.valor_total = within_limit(total.round_dp(2))?;
        }
        if !self.itens.is_empty() {
            let valor = self.itens.iter().try_fold(Decimal::ZERO, |acc, item| {
                acc.checked_add(item.valor_total).ok_or_else(amount_overflow)
            })?;
            self.valor = within_limit(valor)?;
        }
        Ok(())
    }

    /// Peças citadas nos itens.
    pub fn part_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.itens.iter().filter_map(|item| item.peca_id)
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItemPayload {
    pub tipo: ItemKind,

    #[validate(
        custom(function = "validate_not_blank", message = "A descrição do item é obrigatória."),
        length(max = 200, message = "A descrição do item é obrigatória.")
    )]
    pub descricao: String,

    #[validate(custom(function = "validate_quantity"))]
    pub quantidade: Decimal,

    #[validate(custom(function = "validate_amount"))]
    pub valor_unitario: Decimal,

    pub peca_id: Option<i64>,
}

impl From<BudgetItemPayload> for BudgetItem {
    fn from(payload: BudgetItemPayload) -> Self {
        Self {
            tipo: payload.tipo,
            descricao: payload.descricao.trim().to_string(),
            quantidade: payload.quantidade,
            valor_unitario: payload.valor_unitario,
            valor_total: Decimal::ZERO,
            peca_id: payload.peca_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBudgetPayload {
    // Obrigatório só quando não há itens
    #[validate(custom(function = "validate_amount"))]
    pub valor: Option<Decimal>,

    pub validade: NaiveDate,

    pub status: Option<BudgetStatus>,

    pub descricao: Option<String>,

    pub ordem_servico_cod: Option<i64>,

    #[validate(custom(function = "documents::validate_cpf"))]
    pub cliente_cpf: String,

    #[serde(default)]
    #[validate(nested)]
    pub itens: Vec<BudgetItemPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBudgetPayload {
    #[validate(custom(function = "validate_amount"))]
    pub valor: Option<Decimal>,

    pub validade: Option<NaiveDate>,

    pub status: Option<BudgetStatus>,

    pub descricao: Option<String>,

    pub ordem_servico_cod: Option<i64>,

    #[validate(custom(function = "documents::validate_cpf"))]
    pub cliente_cpf: Option<String>,

    #[validate(nested)]
    pub itens: Option<Vec<BudgetItemPayload>>,
}

#[async_trait]
impl Resource for Budget {
    const LABEL: &'static str = "Orçamento";
    const NOT_FOUND: &'static str = "Orçamento não encontrado.";
    const TABLE: &'static str = "orcamentos";
    const KEY: &'static str = "id";
    const KEY_KIND: KeyKind = KeyKind::Serial;
    const COLUMNS: &'static [&'static str] = &[
        "valor",
        "validade",
        "status",
        "descricao",
        "ordem_servico_cod",
        "cliente_cpf",
        "itens",
    ];

    type Create = CreateBudgetPayload;
    type Update = UpdateBudgetPayload;
    type View = Budget;

    fn repository(store: &Store) -> &dyn Repository<Self> {
        store.budgets.as_ref()
    }

    fn key(&self) -> String {
        self.id.to_string()
    }

    fn assign_serial(&mut self, id: i64) {
        self.id = id;
    }

    async fn from_create(
        payload: CreateBudgetPayload,
        _ctx: &WriteContext,
    ) -> Result<Self, AppError> {
        if payload.itens.is_empty() && payload.valor.is_none() {
            return Err(AppError::BadRequest(
                "Informe o valor do orçamento ou seus itens.".to_string(),
            ));
        }

        let mut budget = Budget {
            id: 0,
            valor: payload.valor.unwrap_or(Decimal::ZERO),
            validade: payload.validade,
            status: payload.status.unwrap_or_default(),
            descricao: clean_optional(payload.descricao),
            ordem_servico_cod: payload.ordem_servico_cod,
            cliente_cpf: documents::only_digits(&payload.cliente_cpf),
            itens: payload.itens.into_iter().map(BudgetItem::from).collect(),
        };
        budget.recalculate()?;

        Ok(budget)
    }

    async fn apply_update(
        &mut self,
        patch: UpdateBudgetPayload,
        _ctx: &WriteContext,
    ) -> Result<(), AppError> {
        if let Some(valor) = patch.valor {
            self.valor = valor;
        }
        if let Some(validade) = patch.validade {
            self.validade = validade;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if patch.descricao.is_some() {
            self.descricao = clean_optional(patch.descricao);
        }
        if patch.ordem_servico_cod.is_some() {
            self.ordem_servico_cod = patch.ordem_servico_cod;
        }
        if let Some(cpf) = patch.cliente_cpf {
            self.cliente_cpf = documents::only_digits(&cpf);
        }
        if let Some(itens) = patch.itens {
            self.itens = itens.into_iter().map(BudgetItem::from).collect();
        }
        self.recalculate()
    }

    fn into_view(self) -> Budget {
        self
    }

    async fn check_integrity(&self, store: &Store, before: Option<&Self>) -> Result<(), AppError> {
        if changed(before, &self.cliente_cpf, |b| &b.cliente_cpf) {
            ensure_exists::<Client>(store, &self.cliente_cpf).await?;
        }

        if changed(before, &self.ordem_servico_cod, |b| &b.ordem_servico_cod) {
            if let Some(cod) = self.ordem_servico_cod {
                ensure_exists::<ServiceOrder>(store, &cod.to_string()).await?;
            }
        }

        for peca_id in self.part_ids() {
            if before.is_some_and(|b| b.part_ids().any(|known| known == peca_id)) {
                continue;
            }
            ensure_exists::<Part>(store, &peca_id.to_string()).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::resource::MAX_AMOUNT, services::auth::PasswordHasher};
    use serde_json::json;

    fn ctx() -> WriteContext {
        WriteContext::new(PasswordHasher::new(4))
    }

    fn item(tipo: ItemKind, quantidade: i64, unitario: Decimal) -> BudgetItemPayload {
        BudgetItemPayload {
            tipo,
            descricao: "item".into(),
            quantidade: Decimal::from(quantidade),
            valor_unitario: unitario,
            peca_id: None,
        }
    }

    fn create(itens: Vec<BudgetItemPayload>, valor: Option<Decimal>) -> CreateBudgetPayload {
        CreateBudgetPayload {
            valor,
            validade: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            status: None,
            descricao: None,
            ordem_servico_cod: None,
            cliente_cpf: "52998224725".into(),
            itens,
        }
    }

    #[tokio::test]
    async fn total_is_sum_of_item_totals() {
        let budget = Budget::from_create(create(
            vec![
                item(ItemKind::Peca, 2, Decimal::new(4550, 2)),
                item(ItemKind::Servico, 1, Decimal::new(12000, 2)),
            ],
            // Ignorado: há itens
            Some(Decimal::new(1, 0)),
        ), &ctx())
        .await
        .unwrap();

        assert_eq!(budget.itens[0].valor_total, Decimal::new(9100, 2));
        assert_eq!(budget.itens[1].valor_total, Decimal::new(12000, 2));
        assert_eq!(budget.valor, Decimal::new(21100, 2));
        assert_eq!(budget.status, BudgetStatus::P);
    }

    #[tokio::test]
    async fn without_items_valor_is_required() {
        let err = Budget::from_create(create(vec![], None), &ctx()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let budget = Budget::from_create(create(vec![], Some(Decimal::new(300, 0))), &ctx()).await.unwrap();
        assert_eq!(budget.valor, Decimal::new(300, 0));
    }

    #[tokio::test]
    async fn replacing_items_recomputes_valor() {
        let mut budget = Budget::from_create(create(
            vec![item(ItemKind::Peca, 1, Decimal::new(10, 0))],
            None,
        ), &ctx())
        .await
        .unwrap();

        let patch: UpdateBudgetPayload = serde_json::from_value(json!({
            "status": "A",
            "itens": [
                {"tipo": "servico", "descricao": "Revisão", "quantidade": 3, "valorUnitario": 50}
            ]
        }))
        .unwrap();
        budget.apply_update(patch, &ctx()).await.unwrap();

        assert_eq!(budget.status, BudgetStatus::A);
        assert_eq!(budget.valor, Decimal::new(150, 0));
    }

    #[test]
    fn nested_item_validation() {
        let payload = create(vec![item(ItemKind::Peca, 0, Decimal::ONE)], None);
        assert!(payload.validate().is_err());
    }

    #[test]
    fn huge_item_values_fail_validation() {
        let mut huge = item(ItemKind::Peca, 1, Decimal::from_i128_with_scale(10i128.pow(20), 0));
        huge.quantidade = Decimal::from_i128_with_scale(10i128.pow(20), 0);
        assert!(create(vec![huge], None).validate().is_err());

        let blank = BudgetItemPayload { descricao: "   ".into(), ..item(ItemKind::Servico, 1, Decimal::ONE) };
        assert!(create(vec![blank], None).validate().is_err());
    }

    #[tokio::test]
    async fn totals_beyond_the_limit_are_bad_requests() {
        // Cada item cabe no limite, mas o produto e a soma não.
        let err = Budget::from_create(
            create(vec![item(ItemKind::Peca, 2, MAX_AMOUNT)], None),
            &ctx(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut budget = Budget::from_create(
            create(vec![item(ItemKind::Peca, 1, Decimal::ONE)], None),
            &ctx(),
        )
        .await
        .unwrap();
        budget.itens = vec![
            BudgetItem::from(item(ItemKind::Peca, 1, MAX_AMOUNT)),
            BudgetItem::from(item(ItemKind::Peca, 1, MAX_AMOUNT)),
        ];
        assert!(matches!(budget.recalculate(), Err(AppError::BadRequest(_))));

        let mut product = budget.clone();
        product.itens = vec![BudgetItem {
            quantidade: Decimal::MAX,
            valor_unitario: Decimal::MAX,
            ..product.itens[0].clone()
        }];
        assert!(matches!(product.recalculate(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn part_ids_lists_referenced_parts() {
        let mut with_part = item(ItemKind::Peca, 1, Decimal::ONE);
        with_part.peca_id = Some(7);
        let budget = Budget {
            id: 1,
            valor: Decimal::ZERO,
            validade: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            status: BudgetStatus::P,
            descricao: None,
            ordem_servico_cod: None,
            cliente_cpf: "52998224725".into(),
            itens: vec![
                BudgetItem::from(with_part),
                BudgetItem::from(item(ItemKind::Servico, 1, Decimal::ONE)),
            ],
        };
        assert_eq!(budget.part_ids().collect::<Vec<_>>(), vec![7]);
    }
}
