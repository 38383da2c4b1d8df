// src/services/schedule.rs
//
// Derivação de status e agenda de visitas. Funções puras: "hoje" sempre
// chega como argumento, nada aqui toca no banco.

use std::cmp::Ordering;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::models::{
    contract::{AmcType, ContractStatus, ContractView, Customer},
    dashboard::RenewalAlert,
};

pub const CONTRACT_LENGTH_MONTHS: u32 = 12;
pub const RENEWAL_WINDOW_DAYS: i64 = 7;
pub const URGENT_THRESHOLD_DAYS: i64 = 3;

/// Fim do contrato: início + 1 ano. Um início em 29/02 termina em 28/02.
pub fn contract_end_date(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(CONTRACT_LENGTH_MONTHS))
}

/// `active` vira `expired` quando o fim já passou. Os demais ficam como estão.
pub fn effective_status(stored: ContractStatus, end: NaiveDate, today: NaiveDate) -> ContractStatus {
    if stored == ContractStatus::Active && end < today {
        ContractStatus::Expired
    } else {
        stored
    }
}

pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some(last.day())
}

// Dia `day` do mês, limitado ao último dia válido (31 -> 30/04, 31 -> 28/02)
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

/// Plano A: próximo dia da semana igual ao do início do contrato.
/// Se hoje já é o dia e a visita de hoje já foi registrada, vai para a semana seguinte.
pub fn next_weekly_service(start: NaiveDate, today: NaiveDate, serviced_today: bool) -> Option<NaiveDate> {
    let reference = start.max(today);
    let target = start.weekday().num_days_from_monday();
    let current = reference.weekday().num_days_from_monday();
    let offset = (target + 7 - current) % 7;

    let candidate = reference.checked_add_days(Days::new(u64::from(offset)))?;
    if candidate == today && serviced_today {
        candidate.checked_add_days(Days::new(7))
    } else {
        Some(candidate)
    }
}

/// Plano B: mesmo dia do mês do início, neste mês se ainda não passou,
/// senão no mês seguinte (com o dia ajustado ao tamanho do mês).
pub fn next_monthly_service(start: NaiveDate, today: NaiveDate, serviced_today: bool) -> Option<NaiveDate> {
    // Contrato que ainda não começou: primeira visita no próprio início
    if start > today {
        return Some(start);
    }

    let day = start.day();
    let this_month = clamped_date(today.year(), today.month(), day)?;
    let still_due = match this_month.cmp(&today) {
        Ordering::Greater => true,
        Ordering::Equal => !serviced_today,
        Ordering::Less => false,
    };
    if still_due {
        return Some(this_month);
    }

    let next_month = NaiveDate::from_ymd_opt(today.year(), today.month(), 1)?
        .checked_add_months(Months::new(1))?;
    clamped_date(next_month.year(), next_month.month(), day)
}

/// Próxima visita de um contrato. Só contratos efetivamente ativos têm agenda,
/// o plano C é sob demanda, e datas depois do fim do contrato são descartadas.
pub fn next_service_date(
    amc_type: AmcType,
    start: NaiveDate,
    end: NaiveDate,
    status: ContractStatus,
    today: NaiveDate,
    serviced_today: bool,
) -> Option<NaiveDate> {
    if status != ContractStatus::Active {
        return None;
    }

    let next = match amc_type {
        AmcType::A => next_weekly_service(start, today, serviced_today)?,
        AmcType::B => next_monthly_service(start, today, serviced_today)?,
        AmcType::C => return None,
    };

    (next <= end).then_some(next)
}

/// Monta a visão de leitura: status efetivo + próxima visita.
pub fn derive_view(mut customer: Customer, today: NaiveDate, serviced_today: bool) -> ContractView {
    let status = effective_status(customer.status, customer.amc_end_date, today);
    let next_service_date = next_service_date(
        customer.amc_type,
        customer.amc_start_date,
        customer.amc_end_date,
        status,
        today,
        serviced_today,
    );
    let days_until_expiry = (customer.amc_end_date - today).num_days();

    customer.status = status;
    ContractView {
        customer,
        next_service_date,
        days_until_expiry,
    }
}

/// Contratos ativos que vencem nos próximos 7 dias (sem os já vencidos),
/// do mais urgente para o menos urgente.
pub fn renewal_alerts(views: &[ContractView], today: NaiveDate) -> Vec<RenewalAlert> {
    let mut alerts: Vec<RenewalAlert> = views
        .iter()
        .filter(|v| v.customer.status == ContractStatus::Active)
        .filter_map(|v| {
            let days_remaining = (v.customer.amc_end_date - today).num_days();
            if !(0..=RENEWAL_WINDOW_DAYS).contains(&days_remaining) {
                return None;
            }
            Some(RenewalAlert {
                customer_id: v.customer.id,
                company_name: v.customer.company_name.clone(),
                owner_name: v.customer.owner_name.clone(),
                amc_end_date: v.customer.amc_end_date,
                days_remaining,
                urgent: days_remaining <= URGENT_THRESHOLD_DAYS,
            })
        })
        .collect();

    alerts.sort_by(|a, b| {
        a.days_remaining
            .cmp(&b.days_remaining)
            .then_with(|| a.company_name.cmp(&b.company_name))
    });
    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::fixtures::{customer, date};
    use chrono::Weekday;

    #[test]
    fn end_date_is_one_year_later() {
        assert_eq!(contract_end_date(date(2025, 3, 15)), Some(date(2026, 3, 15)));
        assert_eq!(contract_end_date(date(2024, 2, 29)), Some(date(2025, 2, 28)));
        assert_eq!(contract_end_date(date(2023, 12, 31)), Some(date(2024, 12, 31)));
    }

    #[test]
    fn active_contract_expires_after_end() {
        let end = date(2025, 6, 30);
        assert_eq!(effective_status(ContractStatus::Active, end, date(2025, 6, 30)), ContractStatus::Active);
        assert_eq!(effective_status(ContractStatus::Active, end, date(2025, 7, 1)), ContractStatus::Expired);
        // Só o active expira automaticamente
        assert_eq!(effective_status(ContractStatus::Suspended, end, date(2025, 7, 1)), ContractStatus::Suspended);
        assert_eq!(effective_status(ContractStatus::Proposed, end, date(2026, 1, 1)), ContractStatus::Proposed);
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2025, 2), Some(28));
        assert_eq!(days_in_month(2025, 4), Some(30));
        assert_eq!(days_in_month(2025, 12), Some(31));
        assert_eq!(days_in_month(2025, 13), None);
    }

    #[test]
    fn weekly_finds_next_matching_weekday() {
        // 2025-01-06 é segunda-feira
        let start = date(2025, 1, 6);
        assert_eq!(start.weekday(), Weekday::Mon);

        // Quarta -> próxima segunda
        assert_eq!(next_weekly_service(start, date(2025, 3, 12), false), Some(date(2025, 3, 17)));
        // Domingo -> amanhã
        assert_eq!(next_weekly_service(start, date(2025, 3, 16), false), Some(date(2025, 3, 17)));
    }

    #[test]
    fn weekly_same_day_rolls_only_after_visit() {
        let start = date(2025, 1, 6);
        let monday = date(2025, 3, 17);
        assert_eq!(next_weekly_service(start, monday, false), Some(monday));
        assert_eq!(next_weekly_service(start, monday, true), Some(date(2025, 3, 24)));
    }

    #[test]
    fn weekly_future_start_begins_on_start() {
        let start = date(2025, 5, 1);
        assert_eq!(next_weekly_service(start, date(2025, 4, 10), false), Some(start));
    }

    #[test]
    fn monthly_same_month_when_not_passed() {
        let start = date(2025, 1, 20);
        assert_eq!(next_monthly_service(start, date(2025, 3, 5), false), Some(date(2025, 3, 20)));
        assert_eq!(next_monthly_service(start, date(2025, 3, 20), false), Some(date(2025, 3, 20)));
        assert_eq!(next_monthly_service(start, date(2025, 3, 20), true), Some(date(2025, 4, 20)));
        assert_eq!(next_monthly_service(start, date(2025, 3, 21), false), Some(date(2025, 4, 20)));
    }

    #[test]
    fn monthly_clamps_short_months() {
        let start = date(2025, 1, 31);
        // Fevereiro não tem 31: 28 (2025) ou 29 (2024)
        assert_eq!(next_monthly_service(start, date(2025, 2, 10), false), Some(date(2025, 2, 28)));
        assert_eq!(next_monthly_service(date(2024, 1, 31), date(2024, 2, 10), false), Some(date(2024, 2, 29)));
        // Depois de 28/02 já passou -> 31/03
        assert_eq!(next_monthly_service(start, date(2025, 2, 28), true), Some(date(2025, 3, 31)));
        // Abril tem 30
        assert_eq!(next_monthly_service(start, date(2025, 4, 2), false), Some(date(2025, 4, 30)));
        // Virada de ano
        assert_eq!(next_monthly_service(start, date(2025, 12, 31), true), Some(date(2026, 1, 31)));
    }

    #[test]
    fn monthly_next_month_is_clamped_too() {
        // 30/01 já passou -> fevereiro só tem 28
        let start = date(2025, 1, 30);
        assert_eq!(next_monthly_service(start, date(2026, 1, 31), false), Some(date(2026, 2, 28)));
    }

    #[test]
    fn on_demand_and_inactive_contracts_have_no_schedule() {
        let start = date(2025, 1, 6);
        let end = date(2026, 1, 6);
        let today = date(2025, 3, 12);

        assert_eq!(next_service_date(AmcType::C, start, end, ContractStatus::Active, today, false), None);
        assert_eq!(next_service_date(AmcType::A, start, end, ContractStatus::Proposed, today, false), None);
        assert_eq!(next_service_date(AmcType::B, start, end, ContractStatus::Suspended, today, false), None);
        assert_eq!(
            next_service_date(AmcType::A, start, end, ContractStatus::Active, today, false),
            Some(date(2025, 3, 17))
        );
    }

    #[test]
    fn schedule_never_goes_past_contract_end() {
        let start = date(2025, 1, 6); // segunda
        let end = date(2026, 1, 6); // terça
        // Hoje = terça 06/01/2026 (último dia): a próxima segunda já cai depois do fim
        assert_eq!(
            next_service_date(AmcType::A, start, end, ContractStatus::Active, date(2026, 1, 6), false),
            None
        );
    }

    #[test]
    fn derived_view_reports_expired_status() {
        let c = customer("Acme", AmcType::A, date(2024, 1, 1), ContractStatus::Active);
        let view = derive_view(c, date(2025, 1, 5), false);
        assert_eq!(view.customer.status, ContractStatus::Expired);
        assert_eq!(view.next_service_date, None);
        assert_eq!(view.days_until_expiry, -4);
    }

    #[test]
    fn derived_view_uses_serviced_flag() {
        let c = customer("Acme", AmcType::B, date(2025, 1, 15), ContractStatus::Active);
        let today = date(2025, 4, 15);
        assert_eq!(derive_view(c.clone(), today, false).next_service_date, Some(today));
        assert_eq!(derive_view(c, today, true).next_service_date, Some(date(2025, 5, 15)));
    }

    #[test]
    fn renewal_alerts_window_and_order() {
        let today = date(2025, 6, 10);
        // Fins: hoje+5, hoje+2, hoje+0, hoje+8 (fora), hoje-1 (vencido)
        let views: Vec<ContractView> = [
            ("Delta", date(2024, 6, 15), ContractStatus::Active),
            ("Bravo", date(2024, 6, 12), ContractStatus::Active),
            ("Alpha", date(2024, 6, 10), ContractStatus::Active),
            ("Echo", date(2024, 6, 18), ContractStatus::Active),
            ("Foxtrot", date(2024, 6, 9), ContractStatus::Active),
            ("Golf", date(2024, 6, 12), ContractStatus::Suspended),
        ]
        .into_iter()
        .map(|(name, start, status)| derive_view(customer(name, AmcType::B, start, status), today, false))
        .collect();

        let alerts = renewal_alerts(&views, today);
        let names: Vec<&str> = alerts.iter().map(|a| a.company_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Bravo", "Delta"]);

        assert_eq!(alerts[0].days_remaining, 0);
        assert!(alerts[0].urgent);
        assert_eq!(alerts[1].days_remaining, 2);
        assert!(alerts[1].urgent);
        assert_eq!(alerts[2].days_remaining, 5);
        assert!(!alerts[2].urgent);
    }

    #[test]
    fn renewal_alert_boundaries() {
        let today = date(2025, 6, 10);
        let at_seven = derive_view(customer("Seven", AmcType::C, date(2024, 6, 17), ContractStatus::Active), today, false);
        let at_three = derive_view(customer("Three", AmcType::C, date(2024, 6, 13), ContractStatus::Active), today, false);
        let at_four = derive_view(customer("Four", AmcType::C, date(2024, 6, 14), ContractStatus::Active), today, false);

        let alerts = renewal_alerts(&[at_seven, at_three, at_four], today);
        assert_eq!(alerts.len(), 3);
        assert_eq!((alerts[0].days_remaining, alerts[0].urgent), (3, true));
        assert_eq!((alerts[1].days_remaining, alerts[1].urgent), (4, false));
        assert_eq!((alerts[2].days_remaining, alerts[2].urgent), (7, false));
    }
}
