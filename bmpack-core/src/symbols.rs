//! Symbol table and generated header text

use crate::{Error, MemoryBudget, Result};
use std::collections::HashSet;
use std::io::Write;

/// One `#define <name>_OFFSET <offset>` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub offset: u64,
}

/// Summary figures appended after the symbol lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total_used: u64,
    /// Signed so an over-budget run still renders
    pub total_available: i64,
    pub percent_used: u64,
    pub transfer_seconds: u64,
    pub transfer_rate_baud: u32,
}

impl Summary {
    /// Computes the summary figures with truncating integer division
    pub fn compute(total_used: u64, budget: MemoryBudget, transfer_rate_baud: u32) -> Self {
        let capacity = u128::from(budget.capacity_bytes.max(1));
        let used = u128::from(total_used);
        let available = i128::from(budget.capacity_bytes) - i128::from(total_used);
        let rate = u128::from(transfer_rate_baud.max(1));
        Self {
            total_used,
            total_available: available.clamp(i64::MIN.into(), i64::MAX.into()) as i64,
            percent_used: u64::try_from(100 * used / capacity).unwrap_or(u64::MAX),
            transfer_seconds: u64::try_from(8 * used / rate).unwrap_or(u64::MAX),
            transfer_rate_baud,
        }
    }

    /// Whether the packed data no longer fits the budget
    pub fn over_budget(&self) -> bool {
        self.total_available < 0
    }
}

/// Ordered, append-only list of asset offsets
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
    names: HashSet<String>,
    next_offset: u64,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name` at the current running offset and advances it by
    /// `packed_len`. Returns the offset assigned to `name`.
    pub fn push(&mut self, name: &str, packed_len: u64) -> Result<u64> {
        if !self.names.insert(name.to_string()) {
            return Err(Error::DuplicateSymbol(name.to_string()));
        }

        let offset = self.next_offset;
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            offset,
        });
        self.next_offset += packed_len;
        Ok(offset)
    }

    /// Offset the next asset would be placed at, which is also the total used
    pub fn total_used(&self) -> u64 {
        self.next_offset
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Writes the full header text: one line per asset, a blank line, then
    /// the summary defines and the transfer-time comment.
    pub fn write_header<W: Write>(&self, writer: &mut W, summary: &Summary) -> Result<()> {
        for entry in &self.entries {
            writeln!(writer, "#define {}_OFFSET {}", entry.name, entry.offset)?;
        }

        writeln!(writer)?;
        writeln!(writer, "#define TOTAL_MEMORY_USED {}", summary.total_used)?;
        writeln!(writer, "#define TOTAL_MEMORY_AVAILABLE {}", summary.total_available)?;
        writeln!(writer, "#define TOTAL_MEMORY_PERCENT_USED {}", summary.percent_used)?;
        writeln!(
            writer,
            "// Time to load all data at {} baud: {} seconds",
            summary.transfer_rate_baud, summary.transfer_seconds
        )?;
        Ok(())
    }
}
