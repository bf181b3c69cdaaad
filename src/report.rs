//! Presentation of results

use crate::bench::aggregate::NO_SAMPLES_LOW;
use crate::bench::latency::Outcome;
use crate::bench::{CampaignReport, ProbeReport};
use crate::types::{Block, BlockResults};
use std::io::{self, Write};
use std::str::FromStr;

/// Renders a finished campaign
pub trait SummarySink {
    fn render(&self, report: &CampaignReport, out: &mut dyn Write) -> io::Result<()>;
}

/// Header plus minimum / average / maximum lines
#[derive(Debug, Default, Clone, Copy)]
pub struct TextSink;

/// Full report as pretty JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSink;

impl SummarySink for TextSink {
    fn render(&self, report: &CampaignReport, out: &mut dyn Write) -> io::Result<()> {
        let s = &report.summary;
        writeln!(
            out,
            "Averages for {}x {} runs at {} over {}",
            s.trials, report.endpoint, report.request_volume, report.transport
        )?;
        if s.empty_trials == s.trials {
            writeln!(out, "Minimum Response Time: n/a (no samples)")?;
        } else {
            writeln!(out, "Minimum Response Time: {} ms", s.low)?;
        }
        writeln!(out, "Average Response Time: {} ms", s.avg)?;
        writeln!(out, "Maximum Response Time: {} ms", s.high)?;

        if s.truncated_trials > 0 {
            writeln!(
                out,
                "Note: {} of {} trials hit the deadline; their averages are divided by the requested volume",
                s.truncated_trials, s.trials
            )?;
        }
        if s.empty_trials > 0 && s.empty_trials < s.trials {
            writeln!(
                out,
                "Note: {} trials collected no samples and report a minimum of {}",
                s.empty_trials, NO_SAMPLES_LOW
            )?;
        }
        Ok(())
    }
}

impl SummarySink for JsonSink {
    fn render(&self, report: &CampaignReport, out: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)
    }
}

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn sink(&self) -> Box<dyn SummarySink> {
        match self {
            OutputFormat::Text => Box::new(TextSink),
            OutputFormat::Json => Box::new(JsonSink),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

pub fn render_probe(report: &ProbeReport, out: &mut dyn Write) -> io::Result<()> {
    let label = report.transport.label();
    for line in &report.lines {
        match &line.sample.outcome {
            Outcome::Success => writeln!(
                out,
                "{} :: {} took {} ms",
                label,
                line.label,
                line.sample.millis()
            )?,
            Outcome::Failure(e) => writeln!(
                out,
                "{} :: {} failed after {} ms: {}",
                label,
                line.label,
                line.sample.millis(),
                e
            )?,
        }
    }
    writeln!(out, "{} requests took {} ms", label, report.total.as_millis())
}

pub fn render_block(block: &Block, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Block ID: {}", block.hash)?;
    writeln!(out, "Chain:    {}", block.chain_id)?;
    writeln!(out, "Height:   {}", block.height)?;
    writeln!(out, "Time:     {}", block.time.as_deref().unwrap_or("-"))?;
    writeln!(out, "Txs:      {}", block.num_txs)?;
    writeln!(out, "AppHash:  {}", block.app_hash)
}

pub fn render_block_results(results: &BlockResults, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Height: {}", results.height)?;
    writeln!(out, "TxResults: {}", results.txs_results.len())?;
    for (i, tx) in results.txs_results.iter().enumerate() {
        writeln!(
            out,
            "  [{}] code={} gas_wanted={} gas_used={} {}",
            i, tx.code, tx.gas_wanted, tx.gas_used, tx.log
        )?;
    }
    writeln!(out, "FinalizeBlockEvents: {}", results.finalize_block_events)?;
    writeln!(out, "AppHash: {}", results.app_hash)
}
