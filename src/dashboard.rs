// The dashboard: runs every calculator once over the extracted sheets and
// prints the sections in the order the report has always used.
use log::info;
use std::path::Path;

use crate::config::Classifier;
use crate::error::Result;
use crate::loader::{parse_availability, parse_customer_info, parse_incidents};
use crate::metrics::{
    compute_availability_metrics, compute_incident_metrics, count_by_root_cause,
    rank_problematic_sites, time_logged_histogram,
};
use crate::output::{
    print_table_rows, render_display_table, write_csv, write_display_csv, write_json,
};
use crate::reports::{format_adhoc_trend, format_availability_report, select_incident_columns};
use crate::types::{
    columns, AvailabilityMetrics, AvailabilityReport, CustomerInfo, DashboardSummary,
    DisplayTable, IncidentMetrics, ProblemSiteRow, RootCauseCount, SheetSet, TimeLoggedBucket,
};
use crate::util::format_int;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub customer: CustomerInfo,
    pub vendor_name: String,
    pub availability: AvailabilityMetrics,
    pub incidents: IncidentMetrics,
    pub top_sites: Vec<ProblemSiteRow>,
    pub root_causes: Vec<RootCauseCount>,
    pub time_logged: Vec<TimeLoggedBucket>,
    pub availability_report: AvailabilityReport,
    pub adhoc_trend: DisplayTable,
    pub incident_report: DisplayTable,
    /// Availability ratio cells that were not numbers and read as blank.
    pub malformed_ratio_cells: usize,
}

impl Dashboard {
    pub fn build(sheets: &SheetSet, classifier: &Classifier) -> Result<Self> {
        let customer = parse_customer_info(&sheets.customer_info)?;
        let incidents = parse_incidents(&sheets.incidents);
        let (availability, malformed_ratio_cells) = parse_availability(&sheets.availability);
        info!(
            "Building dashboard: {} incidents, {} availability rows",
            incidents.len(),
            availability.len()
        );

        Ok(Self {
            customer,
            vendor_name: classifier.vendor_name.clone(),
            availability: compute_availability_metrics(&availability),
            incidents: compute_incident_metrics(&incidents, classifier),
            top_sites: rank_problematic_sites(&incidents),
            root_causes: count_by_root_cause(&incidents),
            time_logged: time_logged_histogram(&incidents),
            availability_report: format_availability_report(&sheets.availability),
            adhoc_trend: format_adhoc_trend(&sheets.adhoc),
            incident_report: select_incident_columns(&sheets.incidents),
            malformed_ratio_cells,
        })
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            period: self.customer.period.clone(),
            customer_name: self.customer.customer_name.clone(),
            service_managers: self.customer.service_managers.clone(),
            availability: self.availability,
            incidents: self.incidents,
            top_sites: self.top_sites.clone(),
            root_causes: self.root_causes.clone(),
            malformed_ratio_cells: self.malformed_ratio_cells,
        }
    }

    pub fn print(&self, max_rows: usize) {
        let period = &self.customer.period;
        println!("📊 Service Portfolio Overview");
        println!("Period: {}", period);
        println!("Customer Name: {}", self.customer.customer_name);
        println!(
            "Service Manager: {}",
            self.customer.service_managers.join(", ")
        );
        println!("---\n");

        println!("Top KPIs\n");
        print_kpis(&[
            ("No. of Sites that Met SLA", self.availability.above_target_count),
            ("No. of Sites That Missed SLA", self.availability.missed_count),
            ("No. of Sites Reported On", self.availability.total_sites),
        ]);
        let vendor_label = format!("No. of {} Caused Incidents", self.vendor_name);
        print_kpis(&[
            ("No. of Incidents Logged this Period", self.incidents.total),
            ("No. of Customer Caused Incidents", self.incidents.customer_caused),
            ("No. of Incidents Closed", self.incidents.closed),
            ("No. of Incidents still Open", self.incidents.open),
            (vendor_label.as_str(), self.incidents.vendor_caused),
        ]);

        println!("Top 10 Problematic Sites:\n");
        print_table_rows(&self.top_sites, self.top_sites.len());

        println!("---\nAnalysis\n");
        println!("Number of Incidents Logged by Root Cause\n");
        println!("{}\n", render_bar_chart(&self.root_causes, BAR_WIDTH));

        println!("Time Logged by Root Cause\n");
        print_table_rows(&self.time_logged, self.time_logged.len());

        println!("Site Availability Report: {}\n", period);
        println!(
            "{}\n",
            render_display_table(
                &self.availability_report.table,
                max_rows,
                Some((
                    columns::ACTUAL_AVAILABILITY,
                    &self.availability_report.below_target[..]
                )),
            )
        );
        if self.malformed_ratio_cells > 0 {
            println!(
                "Note: {} availability value(s) were not numbers and were left out of the SLA counts.\n",
                format_int(self.malformed_ratio_cells)
            );
        }

        println!("Site Availability – 3 Months Trend\n");
        println!("{}\n", render_display_table(&self.adhoc_trend, max_rows, None));

        println!("Incident Report: {}\n", period);
        println!(
            "{}\n",
            render_display_table(&self.incident_report, max_rows, None)
        );
    }

    /// Write every table and the JSON summary into `dir`.
    pub fn export(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        write_csv(&dir.join("top_sites.csv"), &self.top_sites)?;
        write_csv(&dir.join("root_causes.csv"), &self.root_causes)?;
        write_csv(&dir.join("time_logged.csv"), &self.time_logged)?;
        write_display_csv(
            &dir.join("availability_report.csv"),
            &self.availability_report.table,
            Some(("Below Target", &self.availability_report.below_target[..])),
        )?;
        write_display_csv(&dir.join("adhoc_trend.csv"), &self.adhoc_trend, None)?;
        write_display_csv(&dir.join("incident_report.csv"), &self.incident_report, None)?;
        write_json(&dir.join("summary.json"), &self.summary())?;
        info!("Exported report tables to {}", dir.display());
        Ok(())
    }
}

fn print_kpis(kpis: &[(&str, usize)]) {
    for (label, value) in kpis {
        println!("{:<40} {:>8}", label, format_int(*value));
    }
    println!();
}

/// Horizontal bar chart, one line per root cause, longest bar `width` cells.
pub fn render_bar_chart(counts: &[RootCauseCount], width: usize) -> String {
    let Some(max) = counts.iter().map(|c| c.count).max() else {
        return "(no incidents)".to_string();
    };
    let label_width = counts
        .iter()
        .map(|c| c.root_cause.chars().count())
        .max()
        .unwrap_or(0);
    counts
        .iter()
        .map(|c| {
            let len = (c.count * width).div_ceil(max.max(1));
            let pad = label_width - c.root_cause.chars().count();
            format!(
                "{}{} | {} {}",
                c.root_cause,
                " ".repeat(pad),
                "█".repeat(len),
                format_int(c.count)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
