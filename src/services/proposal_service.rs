// src/services/proposal_service.rs

use std::path::PathBuf;

use chrono::{DateTime, Days, NaiveDate, Utc};
use genpdf::{elements, style, Element, Margins};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{Acquire, Executor, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, SettingsRepository},
    models::{
        contract::{AmcType, Customer},
        settings::{self, BusinessProfile},
    },
    services::schedule::CONTRACT_LENGTH_MONTHS,
};

pub const PROPOSAL_VALIDITY_DAYS: u64 = 30;

const TERMS_AND_CONDITIONS: [&str; 7] = [
    "Payment terms: 100% advance payment required before service commencement.",
    "Service will be provided during business hours (9 AM to 6 PM).",
    "Emergency breakdown services available 24/7 for Type A customers.",
    "Customer must provide safe and easy access to the equipment.",
    "Replacement parts, if required, will be charged separately.",
    "This contract is non-transferable and valid for the specified duration only.",
    "Any modifications to this agreement must be in writing and signed by both parties.",
];

const PAYMENT_MODES: &str = "Bank Transfer / Cheque / Cash";

// --- O DOCUMENTO ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    #[schema(value_type = String)]
    pub title: &'static str,
    #[schema(value_type = String)]
    pub frequency: &'static str,
    #[schema(value_type = Vec<String>)]
    pub services: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalProvider {
    pub company_name: String,
    pub tagline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalClient {
    pub company_name: String,
    pub contact_person: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalContract {
    #[schema(value_type = String, format = Date)]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub end_date: NaiveDate,
    pub duration_months: u32,
    #[schema(value_type = f64)]
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    #[schema(value_type = String)]
    pub modes: &'static str,
    pub bank_details: Option<String>,
    pub gst_number: Option<String>,
    pub upi_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDocument {
    #[schema(example = "PROP-1743400000000")]
    pub proposal_number: String,
    #[schema(value_type = String, format = Date)]
    pub proposal_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub valid_until: NaiveDate,
    pub provider: ProposalProvider,
    pub client: ProposalClient,
    pub product_description: Option<String>,
    pub plan: PlanDetails,
    pub contract: ProposalContract,
    #[schema(value_type = Vec<String>)]
    pub terms: Vec<&'static str>,
    pub payment: PaymentDetails,
}

/// Conteúdo comercial de cada plano
pub fn plan_details(amc_type: AmcType) -> PlanDetails {
    match amc_type {
        AmcType::A => PlanDetails {
            title: "TYPE A (Premium Plan) - Weekly Service",
            frequency: "Weekly Service Visits",
            services: vec![
                "CCTV camera system weekly testing of recording, time and date, power supply, hard disk as well as camera system",
                "CCTV camera system backup when required",
                "Unlimited breakdown service calls in CCTV camera system",
                "Software upgrade, online monitoring and monitoring report in CCTV camera system",
                "Hard disk health as well as other information in CCTV camera system",
                "1st Priority service call attendance",
            ],
        },
        AmcType::B => PlanDetails {
            title: "TYPE B (Standard Plan) - Monthly Service",
            frequency: "Monthly Service Visits",
            services: vec![
                "Camera system monthly testing of recording, time and date, power supply, hard disk as well as camera system",
                "CCTV camera system backup when required",
                "Unlimited breakdown service calls in CCTV camera system",
                "Software upgrade, online monitoring and monitoring report in CCTV camera system",
                "Hard disk health as well as other information in CCTV camera system",
                "2nd Priority service call attendance",
            ],
        },
        AmcType::C => PlanDetails {
            title: "TYPE C (Basic Plan) - On-Demand Service",
            frequency: "On-Demand Service Only",
            services: vec![
                "CCTV camera system backup when required",
                "Unlimited breakdown service calls in CCTV camera system",
                "Software upgrade and online support in CCTV camera system",
                "Hard disk health as well as other information in CCTV camera system",
                "3rd Priority service call attendance",
            ],
        },
    }
}

/// Monta a proposta. `issued_at` gera o número, `today` as datas.
pub fn build_proposal(
    customer: &Customer,
    profile: &BusinessProfile,
    today: NaiveDate,
    issued_at: DateTime<Utc>,
) -> ProposalDocument {
    let description = customer.product_description.trim();

    ProposalDocument {
        proposal_number: format!("PROP-{}", issued_at.timestamp_millis()),
        proposal_date: today,
        valid_until: today
            .checked_add_days(Days::new(PROPOSAL_VALIDITY_DAYS))
            .unwrap_or(today),
        provider: ProposalProvider {
            company_name: profile
                .company_name
                .clone()
                .unwrap_or_else(|| settings::DEFAULT_COMPANY_NAME.to_string()),
            tagline: profile.tagline.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
        },
        client: ProposalClient {
            company_name: customer.company_name.clone(),
            contact_person: customer.owner_name.clone(),
            address: customer.address.clone(),
            city: customer.city.clone(),
            phone: customer.phone_number.clone(),
        },
        product_description: (!description.is_empty()).then(|| description.to_string()),
        plan: plan_details(customer.amc_type),
        contract: ProposalContract {
            start_date: customer.amc_start_date,
            end_date: customer.amc_end_date,
            duration_months: CONTRACT_LENGTH_MONTHS,
            total_amount: customer.amc_amount,
        },
        terms: TERMS_AND_CONDITIONS.to_vec(),
        payment: PaymentDetails {
            modes: PAYMENT_MODES,
            bank_details: profile.bank_details.clone(),
            gst_number: profile.gst_number.clone(),
            upi_id: profile.upi_id.clone(),
        },
    }
}

/// Link de pagamento UPI usado no QR Code
pub fn upi_payment_uri(upi_id: &str, payee: &str, amount: Decimal) -> String {
    let amount = format!("{:.2}", amount);
    format!(
        "upi://pay?pa={}&pn={}&am={}&cu=INR",
        urlencoding::encode(upi_id.trim()),
        urlencoding::encode(payee),
        urlencoding::encode(&amount)
    )
}

fn fmt_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::PdfError(e.to_string())
}

// --- SERVIÇO ---

#[derive(Clone)]
pub struct ProposalService {
    customers: CustomerRepository,
    settings_repo: SettingsRepository,
    fonts_dir: PathBuf,
}

impl ProposalService {
    pub fn new(customers: CustomerRepository, settings_repo: SettingsRepository, fonts_dir: PathBuf) -> Self {
        Self { customers, settings_repo, fonts_dir }
    }

    pub async fn get_proposal<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        today: NaiveDate,
    ) -> Result<ProposalDocument, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let customer = self
            .customers
            .find(&mut *tx, user_id, customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        let profile = self.settings_repo.get_profile(&mut *tx, user_id).await?;

        tx.commit().await?;

        Ok(build_proposal(&customer, &profile, today, Utc::now()))
    }

    pub async fn generate_proposal_pdf<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        customer_id: Uuid,
        today: NaiveDate,
    ) -> Result<(ProposalDocument, Vec<u8>), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let proposal = self.get_proposal(executor, user_id, customer_id, today).await?;

        // genpdf é síncrono e usa CPU: roda fora do runtime
        let fonts_dir = self.fonts_dir.clone();
        let doc = proposal.clone();
        let bytes = tokio::task::spawn_blocking(move || render_pdf(&doc, &fonts_dir))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task do PDF: {}", e))??;

        tracing::info!("🖨️ Proposta {} gerada ({} bytes)", proposal.proposal_number, bytes.len());

        Ok((proposal, bytes))
    }
}

// --- RENDERIZAÇÃO (genpdf) ---

pub fn render_pdf(proposal: &ProposalDocument, fonts_dir: &std::path::Path) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta configurada
    let font_family = genpdf::fonts::from_files(fonts_dir, "Roboto", None)
        .map_err(|_| AppError::FontNotFound(format!("Roboto não encontrada em {}", fonts_dir.display())))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("AMC Proposal {}", proposal.proposal_number));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    let bold = style::Style::new().bold();
    let small = style::Style::new().with_font_size(9);

    // --- CABEÇALHO DA EMPRESA ---
    let provider = &proposal.provider;
    doc.push(
        elements::Paragraph::new(provider.company_name.as_str())
            .aligned(genpdf::Alignment::Center)
            .styled(style::Style::new().bold().with_font_size(18)),
    );
    if let Some(tagline) = &provider.tagline {
        doc.push(elements::Paragraph::new(tagline.as_str()).aligned(genpdf::Alignment::Center));
    }
    let contact_line = [provider.email.as_deref(), provider.phone.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" | ");
    if !contact_line.is_empty() {
        doc.push(
            elements::Paragraph::new(contact_line)
                .aligned(genpdf::Alignment::Center)
                .styled(small),
        );
    }
    if let Some(address) = &provider.address {
        doc.push(
            elements::Paragraph::new(format!("Address: {}", address))
                .aligned(genpdf::Alignment::Center)
                .styled(small),
        );
    }

    doc.push(elements::Break::new(1.5));
    doc.push(
        elements::Paragraph::new("ANNUAL MAINTENANCE CONTRACT PROPOSAL")
            .aligned(genpdf::Alignment::Center)
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Break::new(1));

    // --- PROPOSTA x CLIENTE (duas colunas) ---
    let client = &proposal.client;
    let mut header = elements::TableLayout::new(vec![1, 1]);
    header.set_cell_decorator(elements::FrameCellDecorator::new(false, false, false));

    let mut left = elements::LinearLayout::vertical();
    left.push(elements::Paragraph::new("Proposal Details").styled(bold));
    left.push(elements::Paragraph::new(format!("Proposal No: {}", proposal.proposal_number)));
    left.push(elements::Paragraph::new(format!("Date: {}", fmt_date(proposal.proposal_date))));
    left.push(elements::Paragraph::new(format!("Valid Until: {}", fmt_date(proposal.valid_until))));

    let mut right = elements::LinearLayout::vertical();
    right.push(elements::Paragraph::new("Client Details").styled(bold));
    right.push(elements::Paragraph::new(format!("Company: {}", client.company_name)));
    right.push(elements::Paragraph::new(format!("Contact Person: {}", client.contact_person)));
    right.push(elements::Paragraph::new(format!("Address: {}", client.address)));
    right.push(elements::Paragraph::new(format!("City: {}", client.city)));
    right.push(elements::Paragraph::new(format!("Phone: {}", client.phone)));

    header
        .row()
        .element(left.padded(Margins::trbl(0, 2, 0, 0)))
        .element(right)
        .push()
        .map_err(pdf_err)?;
    doc.push(header);
    doc.push(elements::Break::new(1));

    // --- EQUIPAMENTO ---
    if let Some(description) = &proposal.product_description {
        doc.push(elements::Paragraph::new("Equipment / Product Description").styled(bold));
        doc.push(elements::Paragraph::new(description.as_str()));
        doc.push(elements::Break::new(1));
    }

    // --- PLANO ---
    let plan = &proposal.plan;
    doc.push(elements::Paragraph::new(plan.title).styled(style::Style::new().bold().with_font_size(12)));
    doc.push(elements::Paragraph::new(format!("Service Frequency: {}", plan.frequency)));
    let mut services = elements::UnorderedList::new();
    for service in &plan.services {
        services.push(elements::Paragraph::new(*service));
    }
    doc.push(services);
    doc.push(elements::Break::new(1));

    // --- CONTRATO ---
    let contract = &proposal.contract;
    let mut table = elements::TableLayout::new(vec![2, 3]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    let rows = [
        ("Start Date", fmt_date(contract.start_date)),
        ("End Date", fmt_date(contract.end_date)),
        ("Duration", format!("{} Months", contract.duration_months)),
        ("Total AMC Amount", format!("Rs. {:.2}", contract.total_amount)),
    ];
    for (label, value) in rows {
        table
            .row()
            .element(elements::Paragraph::new(label).styled(bold).padded(1))
            .element(elements::Paragraph::new(value).padded(1))
            .push()
            .map_err(pdf_err)?;
    }
    doc.push(table);
    doc.push(elements::Break::new(1));

    // --- TERMOS ---
    doc.push(elements::Paragraph::new("Terms and Conditions").styled(bold));
    let mut terms = elements::OrderedList::new();
    for term in &proposal.terms {
        terms.push(elements::Paragraph::new(*term).styled(small));
    }
    doc.push(terms);
    doc.push(elements::Break::new(1));

    // --- PAGAMENTO ---
    let payment = &proposal.payment;
    doc.push(elements::Paragraph::new("Payment Details").styled(bold));
    doc.push(elements::Paragraph::new(format!("Payment Mode: {}", payment.modes)));
    if let Some(bank) = &payment.bank_details {
        doc.push(elements::Paragraph::new(format!("Bank Details: {}", bank)));
    }
    if let Some(gst) = &payment.gst_number {
        doc.push(elements::Paragraph::new(format!("GST No: {}", gst)));
    }

    if let Some(upi_id) = &payment.upi_id {
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(format!("Pay via UPI: {}", upi_id)));

        let uri = upi_payment_uri(upi_id, &provider.company_name, contract.total_amount);
        let code = QrCode::new(uri.as_bytes()).map_err(pdf_err)?;

        // Renderiza para imagem e converte para genpdf::Image
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_err)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);
    }

    // --- ASSINATURAS ---
    doc.push(elements::Break::new(2));
    let mut signatures = elements::TableLayout::new(vec![1, 1]);
    signatures.set_cell_decorator(elements::FrameCellDecorator::new(false, false, false));
    signatures
        .row()
        .element(elements::Paragraph::new(format!("For {}", provider.company_name)).styled(bold))
        .element(elements::Paragraph::new("Client Acceptance").styled(bold))
        .push()
        .map_err(pdf_err)?;
    signatures
        .row()
        .element(elements::Paragraph::new("Authorized Signatory: ____________"))
        .element(elements::Paragraph::new(format!("{}: ____________", client.contact_person)))
        .push()
        .map_err(pdf_err)?;
    doc.push(signatures);

    // --- RODAPÉ ---
    doc.push(elements::Break::new(2));
    doc.push(
        elements::Paragraph::new(format!(
            "Thank you for choosing {} for your CCTV maintenance needs.",
            provider.company_name
        ))
        .aligned(genpdf::Alignment::Center)
        .styled(style::Style::new().italic().with_font_size(8)),
    );

    // Renderiza para Buffer (Memória)
    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_err)?;

    Ok(buffer)
}
