// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Vector configuration instructions (`vsetvli`, `vsetivli`, `vsetvl`)

use crate::instruction::format::TypeVset;
use crate::instruction::vtype::Vtype;
use crate::location::{Location, Register};
use crate::trace::Record;

use super::{Class, Context, Effect, Inconsistency, Kind};

/// Source of the application vector length
#[derive(Copy, Clone, Debug)]
enum Avl {
    Register(Register),
    Immediate(u8),
}

pub(super) fn decode(insn: u32, record: &Record, ctx: &mut Context) -> Result<Effect, Kind> {
    let vset = TypeVset::try_from(insn).map_err(|i| Kind::UnsupportedInstruction(i.into()))?;
    let snapshot = record
        .vtype
        .map(|raw| Vtype::try_from(raw).map_err(Inconsistency::ReservedVtype))
        .transpose()?;

    let (mut effect, rd, avl, vtype) = match vset {
        TypeVset::Vsetvli { rd, rs1, zimm } => {
            let requested = Vtype::from_zimm(zimm);
            let mut effect = Effect::new("vsetvli", Class::Configuration);
            effect.operands = format!("x{rd}, x{rs1}, {requested}");
            (effect, rd, Avl::Register(rs1), confirm(requested, snapshot)?)
        }
        TypeVset::Vsetivli { rd, uimm, zimm } => {
            let requested = Vtype::from_zimm(zimm);
            let mut effect = Effect::new("vsetivli", Class::Configuration);
            effect.operands = format!("x{rd}, {uimm}, {requested}");
            (effect, rd, Avl::Immediate(uimm), confirm(requested, snapshot)?)
        }
        TypeVset::Vsetvl { rd, rs1, rs2 } => {
            let vtype = snapshot
                .or_else(|| {
                    record
                        .rs2_value
                        .map(|raw| Vtype::try_from(raw).unwrap_or(Vtype::ILLEGAL))
                })
                .ok_or(Kind::MalformedTraceRecord("vtype"))?;
            let mut effect = Effect::new("vsetvl", Class::Configuration);
            effect.operands = format!("x{rd}, x{rs1}, x{rs2}");
            effect.read_scalar(rs2);
            (effect, rd, Avl::Register(rs1), vtype)
        }
    };

    match avl {
        Avl::Register(0) if rd == 0 => effect.read(Location::Vl),
        Avl::Register(rs1) => effect.read_scalar(rs1),
        Avl::Immediate(_) => (),
    }
    effect.write(Location::Vl);
    effect.write(Location::Vtype);
    effect.write_scalar(rd);

    let vl = new_vl(record, ctx, rd, avl, vtype);
    if vl.is_none() {
        tracing::warn!(index = ?record.number, "vl unknown after configuration");
    }
    ctx.vtype = Some(vtype);
    ctx.vl = vl;
    Ok(effect)
}

/// Check a requested `vtype` against the record's snapshot
///
/// Implementations set `vill` for configurations they do not support, so a
/// snapshot with `vill` set is accepted for any request.
fn confirm(requested: Vtype, snapshot: Option<Vtype>) -> Result<Vtype, Inconsistency> {
    match snapshot {
        Some(snapshot) if snapshot.vill => Ok(snapshot),
        Some(snapshot) if snapshot != requested => Err(Inconsistency::SnapshotMismatch {
            active: requested,
            snapshot,
        }),
        _ => Ok(requested),
    }
}

/// Determine the `vl` established by a configuration instruction
fn new_vl(record: &Record, ctx: &Context, rd: Register, avl: Avl, vtype: Vtype) -> Option<u64> {
    if vtype.vill {
        return Some(0);
    }
    if record.vl.is_some() {
        return record.vl;
    }
    if rd != 0 && record.rd_value.is_some() {
        return record.rd_value;
    }

    let vlmax = ctx.vlmax(vtype);
    let avl = match avl {
        Avl::Register(0) if rd == 0 => return ctx.vl,
        Avl::Register(0) => return vlmax,
        Avl::Register(_) => record.rs1_value?,
        Avl::Immediate(uimm) => uimm.into(),
    };
    match vlmax? {
        max if avl <= max => Some(avl),
        max if avl >= 2 * max => Some(max),
        _ => None,
    }
}
