//! Text rendering of inspected pages.

use std::fmt;

use crate::inspect::{PageInspection, SlotOutcome};

/// Human-readable report of one page.
///
/// ```text
/// == Page 0 ==
/// pd_lower=28 pd_upper=8100 pd_special=8192  | free=8072 bytes
/// lsn=(0,0) checksum=0 flags=0x0000 pagesize_ver=8196 prune_xid=0
/// line pointers: 1
///  [ 1] lp_off=8100 lp_len= 35 flags=1 (NORMAL)
///       xmin=740 xmax=0 ctid=(0,1) natts=2 hoff=24 infomask=0x0902 infomask2=0x0002
///       demo: id=42, name="hi"
/// ```
pub struct PageReport<'a>(pub &'a PageInspection);

impl fmt::Display for PageReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = self.0;
        let h = &page.header;

        writeln!(f, "== Page {} ==", page.page_id)?;
        writeln!(
            f,
            "pd_lower={} pd_upper={} pd_special={}  | free={} bytes",
            h.lower,
            h.upper,
            h.special,
            h.free_space()
        )?;
        writeln!(
            f,
            "lsn=({},{}) checksum={} flags=0x{:04x} pagesize_ver={} prune_xid={}",
            h.lsn_hi, h.lsn_lo, h.checksum, h.flags, h.pagesize_version, h.prune_xid
        )?;
        writeln!(f, "line pointers: {}", page.slots.len())?;

        for slot in &page.slots {
            let lp = &slot.line_pointer;
            writeln!(
                f,
                " [{:2}] lp_off={:4} lp_len={:3} flags={} ({})",
                lp.index,
                lp.offset,
                lp.length,
                lp.flags(),
                lp.state
            )?;

            match &slot.outcome {
                SlotOutcome::Skipped => {}
                SlotOutcome::Failed(err) => writeln!(f, "      ERROR: {}", err)?,
                SlotOutcome::Tuple { header, row } => {
                    writeln!(
                        f,
                        "      xmin={} xmax={} ctid={} natts={} hoff={} infomask={} infomask2={}",
                        header.xmin,
                        header.xmax,
                        header.ctid,
                        header.natts(),
                        header.hoff,
                        header.infomask,
                        header.infomask2
                    )?;
                    match row {
                        None => {}
                        Some(Ok(row)) => writeln!(f, "      demo: {}", row)?,
                        Some(Err(err)) => writeln!(f, "      decode demo row: {}", err)?,
                    }
                }
            }
        }
        Ok(())
    }
}
