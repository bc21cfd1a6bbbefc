// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::service_order::ServiceOrder;

// 1. Os cards do topo
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_clientes: usize,
    pub total_motocicletas: usize,
    pub total_pecas: usize,
    pub ordens_em_aberto: usize,     // Ordens ainda não validadas
    pub orcamentos_pendentes: usize, // Status P
    pub faturamento: Decimal,        // Ordens validadas: valor + mão de obra
}

// 2. Séries agrupadas para os gráficos
#[derive(Debug, Serialize, PartialEq)]
pub struct CountEntry {
    pub label: String,
    pub total: usize,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RevenueEntry {
    pub mes: String, // YYYY-MM
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub ordens_por_status: Vec<CountEntry>,
    pub orcamentos_por_status: Vec<CountEntry>,
    pub motocicletas_por_marca: Vec<CountEntry>,
    pub faturamento_mensal: Vec<RevenueEntry>,
}

// 3. Últimas ordens
pub type RecentOrders = Vec<ServiceOrder>;
