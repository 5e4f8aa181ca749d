// src/services/document_service.rs

use chrono::{DateTime, FixedOffset, Offset, Utc};
use genpdf::{elements, style, Element};

use crate::{
    common::error::AppError,
    models::report::{CategoryWithItems, ChecklistResponse, ReportStatus},
    services::report_service::{ReportExport, ReportService},
};

const TITLE_COLOR: style::Color = style::Color::Rgb(44, 62, 80);
const HEADING_COLOR: style::Color = style::Color::Rgb(52, 73, 94);
const CATEGORY_COLOR: style::Color = style::Color::Rgb(22, 160, 133);
const CONFORME_COLOR: style::Color = style::Color::Rgb(39, 174, 96);
const NAO_CONFORME_COLOR: style::Color = style::Color::Rgb(231, 76, 60);
const NA_COLOR: style::Color = style::Color::Rgb(149, 165, 166);
const SEM_RESPOSTA_COLOR: style::Color = style::Color::Rgb(189, 195, 199);
const FOOTER_COLOR: style::Color = style::Color::Rgb(128, 128, 128);

/// Fuso fixo do negócio (UTC−3), independente do fuso do servidor.
pub fn business_offset() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap_or_else(|| Utc.fix())
}

pub fn format_business_time(value: Option<DateTime<Utc>>) -> String {
    match value {
        Some(dt) => dt.with_timezone(&business_offset()).format("%d/%m/%Y %H:%M").to_string(),
        None => "N/A".to_string(),
    }
}

pub fn footer_text(now: DateTime<Utc>) -> String {
    format!(
        "Relatório gerado em {}",
        now.with_timezone(&business_offset()).format("%d/%m/%Y às %H:%M")
    )
}

pub fn response_label(resposta: Option<ChecklistResponse>) -> &'static str {
    match resposta {
        Some(ChecklistResponse::Conforme) => "✓ Conforme",
        Some(ChecklistResponse::NaoConforme) => "✗ Não Conforme",
        Some(ChecklistResponse::Na) => "N/A",
        None => "Sem resposta",
    }
}

fn response_color(resposta: Option<ChecklistResponse>) -> style::Color {
    match resposta {
        Some(ChecklistResponse::Conforme) => CONFORME_COLOR,
        Some(ChecklistResponse::NaoConforme) => NAO_CONFORME_COLOR,
        Some(ChecklistResponse::Na) => NA_COLOR,
        None => SEM_RESPOSTA_COLOR,
    }
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Concluido => "Concluído",
        ReportStatus::EmAndamento => "Em Andamento",
    }
}

/// Contagens do resumo da inspeção.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChecklistSummary {
    pub total: usize,
    pub conforme: usize,
    pub nao_conforme: usize,
    pub na: usize,
}

impl ChecklistSummary {
    pub fn from_categories(categories: &[CategoryWithItems]) -> Self {
        let mut summary = Self::default();
        for item in categories.iter().flat_map(|c| c.itens.iter()) {
            summary.total += 1;
            match item.resposta {
                Some(ChecklistResponse::Conforme) => summary.conforme += 1,
                Some(ChecklistResponse::NaoConforme) => summary.nao_conforme += 1,
                Some(ChecklistResponse::Na) => summary.na += 1,
                None => {}
            }
        }
        summary
    }

    pub fn sem_resposta(&self) -> usize {
        self.total - (self.conforme + self.nao_conforme + self.na)
    }

    /// Percentual inteiro (divisão truncada); 0 sem itens.
    pub fn percent(&self, count: usize) -> usize {
        if self.total == 0 { 0 } else { count * 100 / self.total }
    }

    pub fn with_percent(&self, count: usize) -> String {
        format!("{} ({}%)", count, self.percent(count))
    }

    pub fn rows(&self) -> [(&'static str, String); 5] {
        [
            ("Total de Itens Avaliados:", self.total.to_string()),
            ("Itens Conformes:", self.with_percent(self.conforme)),
            ("Itens Não Conformes:", self.with_percent(self.nao_conforme)),
            ("Itens N/A:", self.with_percent(self.na)),
            ("Itens Sem Resposta:", self.sem_resposta().to_string()),
        ]
    }
}

/// Linhas rótulo/valor do cabeçalho, com os fallbacks para dados ausentes.
pub fn header_rows(export: &ReportExport) -> Vec<(&'static str, String)> {
    let report = &export.report;
    vec![
        ("Descrição:", report.descricao.clone()),
        (
            "Cliente:",
            export
                .client
                .as_ref()
                .map(|c| c.nome_fantasia.clone())
                .unwrap_or_else(|| format!("ID: {}", report.cliente_id)),
        ),
        (
            "CNPJ:",
            export
                .client
                .as_ref()
                .map(|c| c.cnpj.clone())
                .filter(|cnpj| !cnpj.is_empty())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        ("Categoria:", report.categoria.clone().unwrap_or_else(|| "N/A".to_string())),
        (
            "Responsável:",
            export
                .inspector
                .as_ref()
                .map(|u| u.nome.clone())
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        ("Status:", status_label(report.status).to_string()),
        ("Data de Criação:", format_business_time(Some(report.criado_em))),
        ("Data de Finalização:", format_business_time(report.finalizado_em)),
    ]
}

pub fn report_pdf_filename(report_id: i32, now: DateTime<Utc>) -> String {
    format!(
        "relatorio_{}_{}.pdf",
        report_id,
        now.with_timezone(&business_offset()).format("%Y%m%d_%H%M%S")
    )
}

#[derive(Clone)]
pub struct DocumentService {
    report_service: ReportService,
    fonts_dir: String,
    font_family: String,
}

impl DocumentService {
    pub fn new(report_service: ReportService, fonts_dir: String, font_family: String) -> Self {
        Self { report_service, fonts_dir, font_family }
    }

    pub async fn generate_report_pdf(&self, report_id: i32) -> Result<Vec<u8>, AppError> {
        // 1. Busca os dados (relatório, cliente, responsável, checklist)
        let export = self.report_service.load_for_export(report_id).await?;

        // 2. Fontes e renderização são bloqueantes
        let fonts_dir = self.fonts_dir.clone();
        let font_family = self.font_family.clone();
        let buffer = tokio::task::spawn_blocking(move || {
            render_report(&export, &fonts_dir, &font_family, Utc::now())
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de geração do PDF: {}", e))??;

        tracing::info!("📄 PDF do relatório {} gerado ({} bytes).", report_id, buffer.len());
        Ok(buffer)
    }
}

/// Blocos do documento, na ordem em que são desenhados.
#[derive(Debug)]
enum Section<'a> {
    Header,
    Checklist(&'a [CategoryWithItems]),
    Summary(ChecklistSummary),
    Footer,
}

fn report_sections(export: &ReportExport) -> Vec<Section<'_>> {
    let mut sections = vec![Section::Header];
    // Sem categorias não há checklist nem resumo
    if !export.categories.is_empty() {
        sections.push(Section::Checklist(&export.categories));
        sections.push(Section::Summary(ChecklistSummary::from_categories(&export.categories)));
    }
    sections.push(Section::Footer);
    sections
}

fn category_heading(category: &CategoryWithItems) -> &str {
    category.category.nome.as_str()
}

fn render_report(
    export: &ReportExport,
    fonts_dir: &str,
    font_family: &str,
    now: DateTime<Utc>,
) -> Result<Vec<u8>, AppError> {
    let fonts = genpdf::fonts::from_files(fonts_dir, font_family, None).map_err(|_| {
        AppError::FontNotFound(format!("Fonte {} não encontrada na pasta {}", font_family, fonts_dir))
    })?;

    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(format!("Relatório de Inspeção #{}", export.report.id));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    for section in report_sections(export) {
        match section {
            Section::Header => push_header(&mut doc, export)?,
            Section::Checklist(categories) => {
                doc.push(
                    elements::Paragraph::new("CHECKLIST DE VERIFICAÇÃO")
                        .styled(style::Style::new().bold().with_font_size(14).with_color(HEADING_COLOR)),
                );
                doc.push(elements::Break::new(1));

                for category in categories {
                    push_category(&mut doc, category)?;
                }
            }
            Section::Summary(summary) => push_summary(&mut doc, &summary)?,
            Section::Footer => {
                doc.push(elements::Break::new(2));
                doc.push(
                    elements::Paragraph::new(footer_text(now))
                        .aligned(genpdf::Alignment::Center)
                        .styled(style::Style::new().italic().with_font_size(8).with_color(FOOTER_COLOR)),
                );
            }
        }
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(buffer)
}

fn push_header(doc: &mut genpdf::Document, export: &ReportExport) -> Result<(), AppError> {
    doc.push(
        elements::Paragraph::new("RELATÓRIO DE INSPEÇÃO")
            .aligned(genpdf::Alignment::Center)
            .styled(style::Style::new().bold().with_font_size(18).with_color(TITLE_COLOR)),
    );
    doc.push(
        elements::Paragraph::new("BPA Digital - Boas Práticas de Alimentação")
            .aligned(genpdf::Alignment::Center)
            .styled(style::Style::new().with_font_size(10)),
    );
    doc.push(elements::Break::new(1.5));

    let mut info_table = elements::TableLayout::new(vec![5, 12]);
    info_table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    for (label, value) in header_rows(export) {
        info_table
            .row()
            .element(elements::Paragraph::new(label).styled(style::Style::new().bold()).padded(1))
            .element(elements::Paragraph::new(value).padded(1))
            .push()?;
    }
    doc.push(info_table);
    doc.push(elements::Break::new(1.5));
    Ok(())
}

// Resumo sempre em página nova
fn push_summary(doc: &mut genpdf::Document, summary: &ChecklistSummary) -> Result<(), AppError> {
    doc.push(elements::PageBreak::new());
    doc.push(
        elements::Paragraph::new("RESUMO DA INSPEÇÃO")
            .styled(style::Style::new().bold().with_font_size(14).with_color(HEADING_COLOR)),
    );
    doc.push(elements::Break::new(1));

    let mut summary_table = elements::TableLayout::new(vec![8, 9]);
    summary_table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    for (label, value) in summary.rows() {
        summary_table
            .row()
            .element(elements::Paragraph::new(label).styled(style::Style::new().bold()).padded(1))
            .element(elements::Paragraph::new(value).padded(1))
            .push()?;
    }
    doc.push(summary_table);
    Ok(())
}

fn push_category(doc: &mut genpdf::Document, category: &CategoryWithItems) -> Result<(), AppError> {
    doc.push(
        elements::Paragraph::new(category_heading(category))
            .styled(style::Style::new().bold().with_font_size(12).with_color(CATEGORY_COLOR)),
    );
    doc.push(elements::Break::new(0.5));

    // Categoria vazia: só o título
    if category.itens.is_empty() {
        doc.push(elements::Break::new(1));
        return Ok(());
    }

    // Pesos das colunas: Código (2), Descrição (7), Resposta (3.5), Observações (4.5)
    let mut table = elements::TableLayout::new(vec![4, 14, 7, 9]);
    table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

    let style_header = style::Style::new().bold().with_color(HEADING_COLOR);
    table
        .row()
        .element(elements::Paragraph::new("Código").styled(style_header).padded(1))
        .element(elements::Paragraph::new("Descrição").styled(style_header).padded(1))
        .element(elements::Paragraph::new("Resposta").styled(style_header).padded(1))
        .element(elements::Paragraph::new("Observações").styled(style_header).padded(1))
        .push()?;

    for item in &category.itens {
        let observacoes = item
            .observacoes
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or("-");

        table
            .row()
            .element(elements::Paragraph::new(item.codigo.as_str()).styled(style::Style::new().bold()).padded(1))
            .element(elements::Paragraph::new(item.descricao.as_str()).padded(1))
            .element(
                elements::Paragraph::new(response_label(item.resposta))
                    .styled(style::Style::new().bold().with_color(response_color(item.resposta)))
                    .padded(1),
            )
            .element(elements::Paragraph::new(observacoes).padded(1))
            .push()?;
    }

    doc.push(table);
    doc.push(elements::Break::new(1));
    Ok(())
}
