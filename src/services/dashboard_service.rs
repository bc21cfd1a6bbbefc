// src/services/dashboard_service.rs

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::Store,
    models::{
        budget::{Budget, BudgetStatus},
        dashboard::{CountEntry, DashboardCharts, DashboardStats, RecentOrders, RevenueEntry},
        resource::amount_overflow,
        service_order::ServiceOrder,
    },
};

pub const RECENT_ORDERS_LIMIT: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    store: Store,
}

impl DashboardService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let orders = self.store.service_orders.list().await?;
        let budgets = self.store.budgets.list().await?;

        Ok(DashboardStats {
            total_clientes: self.store.clients.list().await?.len(),
            total_motocicletas: self.store.motorcycles.list().await?.len(),
            total_pecas: self.store.parts.list().await?.len(),
            ordens_em_aberto: orders.iter().filter(|o| !o.validada).count(),
            orcamentos_pendentes: budgets.iter().filter(|b| b.status == BudgetStatus::P).count(),
            faturamento: revenue(&orders)?,
        })
    }

    pub async fn charts(&self) -> Result<DashboardCharts, AppError> {
        let orders = self.store.service_orders.list().await?;
        let budgets = self.store.budgets.list().await?;
        let motorcycles = self.store.motorcycles.list().await?;

        let brand_names: HashMap<i64, String> = self
            .store
            .brands
            .list()
            .await?
            .into_iter()
            .map(|b| (b.id, b.nome))
            .collect();

        Ok(DashboardCharts {
            ordens_por_status: count_by(&orders, |o| o.status.clone()),
            orcamentos_por_status: budgets_by_status(&budgets),
            motocicletas_por_marca: count_by(&motorcycles, |m| {
                brand_names
                    .get(&m.marca_id)
                    .cloned()
                    .unwrap_or_else(|| format!("Marca #{}", m.marca_id))
            }),
            faturamento_mensal: monthly_revenue(&orders)?,
        })
    }

    pub async fn recent_orders(&self, limit: usize) -> Result<RecentOrders, AppError> {
        let mut orders = self.store.service_orders.list().await?;
        orders.sort_by(|a, b| b.data.cmp(&a.data).then(b.cod.cmp(&a.cod)));
        orders.truncate(limit);
        Ok(orders)
    }
}

// Só ordens validadas contam como faturadas
fn revenue(orders: &[ServiceOrder]) -> Result<Decimal, AppError> {
    orders
        .iter()
        .filter(|o| o.validada)
        .try_fold(Decimal::ZERO, |acc, order| {
            acc.checked_add(order.total()?).ok_or_else(amount_overflow)
        })
}

fn count_by<T>(items: &[T], label: impl Fn(&T) -> String) -> Vec<CountEntry> {
    let mut groups: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        *groups.entry(label(item)).or_default() += 1;
    }
    groups
        .into_iter()
        .map(|(label, total)| CountEntry { label, total })
        .collect()
}

fn budgets_by_status(budgets: &[Budget]) -> Vec<CountEntry> {
    count_by(budgets, |b| b.status.label().to_string())
}

fn monthly_revenue(orders: &[ServiceOrder]) -> Result<Vec<RevenueEntry>, AppError> {
    let mut months: BTreeMap<String, Decimal> = BTreeMap::new();
    for order in orders.iter().filter(|o| o.validada) {
        let month = months.entry(order.data.format("%Y-%m").to_string()).or_default();
        *month = month.checked_add(order.total()?).ok_or_else(amount_overflow)?;
    }
    Ok(months
        .into_iter()
        .map(|(mes, total)| RevenueEntry { mes, total })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(cod: i64, date: (i32, u32, u32), status: &str, validada: bool, valor: i64) -> ServiceOrder {
        ServiceOrder {
            cod,
            titulo: format!("OS {cod}"),
            data: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            descricao: None,
            status: status.into(),
            observacao: None,
            valor: Decimal::from(valor),
            valor_mao_de_obra: Decimal::from(50),
            validada,
            cliente_cpf: "52998224725".into(),
            motocicleta_placa: None,
        }
    }

    fn sample() -> Vec<ServiceOrder> {
        vec![
            order(1, (2026, 1, 10), "Concluída", true, 100),
            order(2, (2026, 1, 20), "Concluída", true, 200),
            order(3, (2026, 2, 5), "Aberta", false, 999),
            order(4, (2026, 2, 5), "Concluída", true, 10),
        ]
    }

    #[test]
    fn revenue_only_counts_validated_orders() {
        assert_eq!(revenue(&sample()).unwrap(), Decimal::from(100 + 200 + 10 + 3 * 50));
    }

    #[test]
    fn revenue_overflow_is_an_error_not_a_panic() {
        let mut orders = sample();
        orders[0].valor = Decimal::MAX;
        orders[1].valor = Decimal::MAX;
        assert!(matches!(revenue(&orders), Err(AppError::BadRequest(_))));
        assert!(matches!(monthly_revenue(&orders), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn monthly_revenue_is_sorted_by_month() {
        let months = monthly_revenue(&sample()).unwrap();
        assert_eq!(
            months,
            vec![
                RevenueEntry { mes: "2026-01".into(), total: Decimal::from(400) },
                RevenueEntry { mes: "2026-02".into(), total: Decimal::from(60) },
            ]
        );
    }

    #[test]
    fn count_by_groups_and_sorts_labels() {
        let counts = count_by(&sample(), |o| o.status.clone());
        assert_eq!(
            counts,
            vec![
                CountEntry { label: "Aberta".into(), total: 1 },
                CountEntry { label: "Concluída".into(), total: 3 },
            ]
        );
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let store = Store::in_memory();
        for o in sample() {
            store.service_orders.insert(o).await.unwrap();
        }
        let service = DashboardService::new(store);

        let recent = service.recent_orders(3).await.unwrap();
        let cods: Vec<i64> = recent.iter().map(|o| o.cod).collect();
        // Mesma data: desempata pelo código maior
        assert_eq!(cods, vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn empty_store_has_zeroed_stats() {
        let service = DashboardService::new(Store::in_memory());
        let stats = service.stats().await.unwrap();
        assert_eq!(stats.total_clientes, 0);
        assert_eq!(stats.faturamento, Decimal::ZERO);
        assert!(service.charts().await.unwrap().faturamento_mensal.is_empty());
    }
}
