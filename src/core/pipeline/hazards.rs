//! Data hazard detection and operand forwarding.
//!
//! Read-after-write hazards are resolved by forwarding not-yet-committed
//! results into the decode-stage register reads. The one case bypassing
//! cannot cover is a load consumed by the very next instruction: the
//! loaded value does not exist until the load's memory data phase, so the
//! consumer holds in decode for one cycle ([`load_use`]).

use crate::common::RegId;
use crate::core::pipeline::latches::{IdEx, IfId};
use crate::core::pipeline::signals;

/// Checks for a load-use hazard between the execute-stage occupant and
/// the instruction sitting in decode.
///
/// Returns `true` when the execute stage holds a load whose destination
/// is read (as rs or rt) by the decode-stage instruction; the pipeline
/// must then stall decode for exactly one cycle.
pub fn load_use(id_ex: &Option<IdEx>, if_id: &Option<IfId>) -> bool {
    let Some(ex) = id_ex else {
        return false;
    };
    if !ex.ctrl.mem_read {
        return false;
    }
    let Some(dest) = ex.dest else {
        return false;
    };
    let Some(fetched) = if_id else {
        return false;
    };
    let Some(d) = signals::decode(fetched.inst) else {
        return false;
    };

    let rs = RegId::Integer(fetched.inst.rs());
    let rt = RegId::Integer(fetched.inst.rt());
    (d.reads_rs && rs == dest) || (d.reads_rt && rt == dest)
}

/// Resolves one register read against the bypass network.
///
/// `base` is the register file value; `ex`, `mem` and `wb` are the
/// in-flight results of the execute, memory and writeback occupants this
/// cycle. Sources are applied oldest first so the youngest producer of
/// the register wins. The writeback source also covers the same-cycle
/// writeback-then-read case, since the register file read observes the
/// pre-write value.
pub fn forward(
    id: RegId,
    base: u64,
    ex: Option<(RegId, u64)>,
    mem: Option<(RegId, u64)>,
    wb: Option<(RegId, u64)>,
) -> u64 {
    let mut value = base;
    for source in [wb, mem, ex] {
        if let Some((dest, v)) = source {
            if dest == id {
                value = v;
            }
        }
    }
    value
}
