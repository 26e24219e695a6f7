//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use plct_domain::{CompanySummary, DetailEntry, Initiative, Snapshot};
use plct_pipeline::{BatchReport, DocumentOutcome, RunStatus};
use serde_json::{json, Value};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a batch report.
    pub fn format_report(&self, report: &BatchReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
        }
    }

    fn format_report_table(&self, report: &BatchReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Document", "Outcome", "Company", "Initiatives", "Time"]);

        for document in &report.documents {
            let (outcome, company, initiatives) = match &document.outcome {
                DocumentOutcome::Processed(summary) => (
                    if summary.flagged {
                        "processed (flagged)".to_string()
                    } else {
                        "processed".to_string()
                    },
                    format!("{} ({})", summary.company, summary.report_year),
                    summary.initiatives.to_string(),
                ),
                DocumentOutcome::AlreadyProcessed => ("already processed".to_string(), String::new(), String::new()),
                DocumentOutcome::Failed { kind, .. } => (kind.to_string(), String::new(), String::new()),
            };
            builder.push_record([
                document.document.clone(),
                outcome,
                company,
                initiatives,
                format!("{:.1}s", document.elapsed_ms as f64 / 1000.0),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        let status = match report.status {
            RunStatus::Success => self.success(&format!("Batch {}", report.status)),
            RunStatus::PartialSuccess => self.warning(&format!("Batch {}", report.status)),
            RunStatus::Failed => self.error(&format!("Batch {}", report.status)),
        };

        format!("{}\n\n{}\n{}", table, report.summary(), status)
    }

    /// Format a company snapshot.
    pub fn format_snapshot(&self, snapshot: &Snapshot) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let companies: Vec<Value> = snapshot.companies.iter().map(company_json).collect();
                let value = json!({
                    "taken_at": snapshot.taken_at_secs,
                    "companies": companies,
                });
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => Ok(self.format_snapshot_table(snapshot)),
        }
    }

    fn format_snapshot_table(&self, snapshot: &Snapshot) -> String {
        if snapshot.companies.is_empty() {
            return self.colorize("No companies found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "Company", "Year", "Sector", "Maturity", "CX", "PE", "OE", "BM", "Initiatives"]);

        for summary in &snapshot.companies {
            let company = &summary.company;
            let dims = &company.dimensions;
            let initiatives = if company.has_no_valid_initiatives {
                "none (flagged)".to_string()
            } else {
                summary.initiative_count.to_string()
            };
            builder.push_record([
                summary.id.to_string(),
                company.name().to_string(),
                company.report_year().to_string(),
                company.profile.sector.to_string(),
                company.profile.maturity.to_string(),
                format!("{:.1}", dims.customer_experience),
                format!("{:.1}", dims.people_empowerment),
                format!("{:.1}", dims.operational_efficiency),
                format!("{:.1}", dims.new_business_models),
                initiatives,
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!(
            "{}\n{}",
            table,
            self.info(&format!(
                "{} companies, {} initiatives",
                snapshot.companies.len(),
                snapshot.initiative_total()
            ))
        )
    }

    /// Format one company's initiatives.
    pub fn format_initiatives(&self, summary: &CompanySummary, initiatives: &[Initiative]) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                let mut value = company_json(summary);
                value["initiatives"] = Value::Array(initiatives.iter().map(initiative_json).collect());
                Ok(serde_json::to_string_pretty(&value)?)
            }
            OutputFormat::Table => Ok(self.format_initiatives_table(summary, initiatives)),
        }
    }

    fn format_initiatives_table(&self, summary: &CompanySummary, initiatives: &[Initiative]) -> String {
        let heading = self.colorize(
            &format!(
                "{} ({}), {}",
                summary.company.name(),
                summary.company.report_year(),
                summary.company.profile.sector
            ),
            "cyan",
        );
        if initiatives.is_empty() {
            return format!("{}\n{}", heading, self.colorize("No initiatives found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Description", "Category", "CX", "PE", "OE", "BM", "Disclosure", "Confidence", "Dominant"]);

        for initiative in initiatives {
            let dims = &initiative.fields.dimensions;
            let confidence = if initiative.scoring.flagged_for_verification {
                format!("{} (verify)", initiative.confidence())
            } else {
                initiative.confidence().to_string()
            };
            builder.push_record([
                truncate(initiative.description(), 60),
                initiative.fields.category.to_string(),
                format!("{:.0}", dims.customer_experience),
                format!("{:.0}", dims.people_empowerment),
                format!("{:.0}", dims.operational_efficiency),
                format!("{:.0}", dims.new_business_models),
                format!("{} ({})", initiative.disclosure_aggregate(), initiative.scoring.disclosure_tier),
                confidence,
                initiative.scoring.dominant_dimension.to_string(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        format!("{}\n{}", heading, table)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn company_json(summary: &CompanySummary) -> Value {
    let company = &summary.company;
    let dims = &company.dimensions;
    json!({
        "id": summary.id.value(),
        "companyName": company.name(),
        "reportYear": company.report_year(),
        "sector": company.profile.sector.as_str(),
        "digitalMaturityLevel": company.profile.maturity.as_str(),
        "strategicPriority": company.profile.strategic_priority.as_str(),
        "customerExperienceScore": dims.customer_experience,
        "peopleEmpowermentScore": dims.people_empowerment,
        "operationalEfficiencyScore": dims.operational_efficiency,
        "newBusinessModelsScore": dims.new_business_models,
        "hasNoValidInitiatives": company.has_no_valid_initiatives,
        "initiativeCount": summary.initiative_count,
    })
}

fn initiative_json(initiative: &Initiative) -> Value {
    let fields = &initiative.fields;
    let scoring = &initiative.scoring;
    json!({
        "description": fields.description,
        "category": fields.category.as_str(),
        "customerExperienceScore": fields.dimensions.customer_experience,
        "peopleEmpowermentScore": fields.dimensions.people_empowerment,
        "operationalEfficiencyScore": fields.dimensions.operational_efficiency,
        "newBusinessModelsScore": fields.dimensions.new_business_models,
        "investmentDisclosure": fields.disclosure.investment,
        "timelineDisclosure": fields.disclosure.timeline,
        "metricsDisclosure": fields.disclosure.metrics,
        "technicalDisclosure": fields.disclosure.technical,
        "rationaleDisclosure": fields.disclosure.rationale,
        "technologyUsed": fields.details.technology_used,
        "department": fields.details.department,
        "timeline": entries_json(&fields.details.timeline),
        "successMetrics": entries_json(&fields.details.success_metrics),
        "innovationLevel": fields.innovation_level.as_str(),
        "expectedImpact": fields.expected_impact,
        "investmentAmount": fields.investment_amount,
        "businessRationale": fields.business_rationale,
        "investorScore": scoring.stakeholder.investor,
        "policyScore": scoring.stakeholder.policy,
        "strategicScore": scoring.stakeholder.strategic,
        "disclosureAggregate": scoring.disclosure_aggregate,
        "disclosureTier": scoring.disclosure_tier.as_str(),
        "confidenceLevel": scoring.confidence.as_str(),
        "totalPlctScore": scoring.total_plct,
        "dominantDimension": scoring.dominant_dimension.as_str(),
        "flaggedForVerification": scoring.flagged_for_verification,
    })
}

fn entries_json(entries: &[DetailEntry]) -> Vec<String> {
    entries.iter().map(ToString::to_string).collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept)
}
