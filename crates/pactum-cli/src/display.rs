//! Vertical card display for contract records.
//!
//! Rows are grouped into sections; a section with no populated rows is
//! skipped entirely.

use pactum_core::{ContractRecord, Issue};

const MAX_LIST_ITEMS: usize = 10;

type Row = (&'static str, Option<String>);

// ── Public API ──

/// Print a single contract record as a vertical card grouped by section.
pub fn print_record_card(record: &ContractRecord) {
    println!("=== {} ===", record.file_name);
    println!("{}", record.id);
    println!();

    print_section(
        "Identity",
        &[
            ("status", Some(record.status.to_string())),
            ("mime_type", Some(record.mime_type.clone())),
            ("file_size", Some(format!("{} bytes", record.file_size))),
            ("confidence", record.confidence.map(|c| format!("{c:.2}"))),
            ("processing_time_ms", record.processing_time_ms.map(|ms| ms.to_string())),
        ],
    );

    if let Some(facts) = &record.facts {
        print_section(
            "Extracted Facts",
            &[
                ("effective_date", facts.effective_date.clone()),
                ("contract_duration_months", facts.duration_months.map(|m| m.to_string())),
                ("contract_duration_raw", facts.duration_raw.clone()),
                ("jurisdiction", facts.jurisdiction.clone()),
                ("risk_score", Some(format!("{}/100", facts.risk_score))),
            ],
        );
        if !facts.parties.is_empty() {
            println!("Parties ({}):", facts.parties.len());
            for party in facts.parties.iter().take(MAX_LIST_ITEMS) {
                match &party.role {
                    Some(role) => println!("  - {} ({role})", party.name),
                    None => println!("  - {}", party.name),
                }
            }
            if facts.parties.len() > MAX_LIST_ITEMS {
                println!("  ... and {} more", facts.parties.len() - MAX_LIST_ITEMS);
            }
            println!();
        }
    }

    print_issues(&record.issues);

    if !record.review_reasons.is_empty() {
        println!("Review Reasons");
        for reason in &record.review_reasons {
            println!("  - {reason}");
        }
        println!();
    }

    print_section(
        "Human Review",
        &[
            ("requires_human_review", Some(yes_no(record.requires_human_review))),
            ("human_approved", record.reviewed_at.map(|_| yes_no(record.human_approved))),
            ("reviewer_notes", record.reviewer_notes.clone()),
        ],
    );

    print_section(
        "Timestamps",
        &[
            ("created_at", Some(record.created_at.to_rfc3339())),
            ("processed_at", record.processed_at.map(|t| t.to_rfc3339())),
            ("reviewed_at", record.reviewed_at.map(|t| t.to_rfc3339())),
        ],
    );
}

/// One line per record, for `list`.
pub fn print_record_table(records: &[ContractRecord]) {
    if records.is_empty() {
        println!("(no contracts)");
        return;
    }
    println!(
        "{:<36}  {:<22}  {:>6}  {:>4}  {}",
        "id", "status", "issues", "risk", "file"
    );
    for record in records {
        let risk = record
            .facts
            .as_ref()
            .map(|f| f.risk_score.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<36}  {:<22}  {:>6}  {:>4}  {}",
            record.id.to_string(),
            record.status.as_str(),
            record.issues.len(),
            risk,
            record.file_name
        );
    }
}

// ── Section rendering ──

fn print_section(header: &str, rows: &[Row]) {
    if rows.iter().all(|(_, value)| value.is_none()) {
        return;
    }
    println!("{header}");
    for (label, value) in rows {
        if let Some(value) = value {
            println!("  {:<26} {}", label, value);
        }
    }
    println!();
}

fn print_issues(issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    println!("Issues ({}):", issues.len());
    for issue in issues {
        println!(
            "  [{}] {} ({}): {}",
            issue.severity.as_str(),
            issue.field,
            issue.rule,
            issue.message
        );
        if let Some(reasoning) = &issue.reasoning {
            println!("      {reasoning}");
        }
    }
    println!();
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}
