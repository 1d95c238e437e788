// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Vector loads and stores
//!
//! Only register footprints are modelled. Memory itself is not a tracked
//! location, so a load never depends on an earlier store.

use crate::instruction::format::{self, TypeVMem};
use crate::instruction::vtype::{Lmul, Sew, Vtype};
use crate::instruction::OpCode;
use crate::location::Location;
use crate::trace::Record;

use super::{Class, Context, Effect, Inconsistency, Kind, group, span};

/// Check whether a `LOAD-FP`/`STORE-FP` instruction is a vector access
pub(super) fn is_vector(insn: u32) -> bool {
    matches!(format::funct3(insn), 0b000 | 0b101 | 0b110 | 0b111)
}

/// Addressing mode
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    UnitStride,
    FaultOnlyFirst,
    WholeRegister,
    Mask,
    Strided,
    Indexed { ordered: bool },
}

pub(super) fn decode(insn: u32, record: &Record, ctx: &mut Context) -> Result<Effect, Kind> {
    let m = TypeVMem::from(insn);
    let unsupported = || Kind::UnsupportedInstruction(insn.into());
    let store = OpCode::from(insn) == OpCode::StoreFp;
    if m.mew {
        return Err(unsupported());
    }
    let eew = match m.width {
        0b000 => Sew::E8,
        0b101 => Sew::E16,
        0b110 => Sew::E32,
        0b111 => Sew::E64,
        _ => return Err(unsupported()),
    };
    let mode = match (m.mop, m.rs2) {
        (0b00, 0b00000) => Mode::UnitStride,
        (0b00, 0b01000) => Mode::WholeRegister,
        (0b00, 0b01011) => Mode::Mask,
        (0b00, 0b10000) if !store => Mode::FaultOnlyFirst,
        (0b00, _) => return Err(unsupported()),
        (0b10, _) => Mode::Strided,
        (0b01, _) => Mode::Indexed { ordered: false },
        _ => Mode::Indexed { ordered: true },
    };

    let fields = m.nf + 1;
    let (op, class) = if store {
        ("s", Class::Store)
    } else {
        ("l", Class::Load)
    };
    let mut effect = Effect::new(mnemonic(op, mode, eew, fields, store), class);
    effect.operands = match mode {
        Mode::Strided => format!("v{}, (x{}), x{}", m.vd, m.rs1, m.rs2),
        Mode::Indexed { .. } => format!("v{}, (x{}), v{}", m.vd, m.rs1, m.rs2),
        _ => format!("v{}, (x{})", m.vd, m.rs1),
    };
    if !m.vm {
        effect.operands.push_str(", v0.t");
    }
    effect.read_scalar(m.rs1);

    if mode == Mode::WholeRegister {
        if !m.vm || Lmul::from_registers(fields).is_none() {
            return Err(unsupported());
        }
        let data = group(m.vd, fields)?;
        if store {
            effect.read_all(data);
        } else {
            effect.write_all(data);
        }
        return Ok(effect);
    }
    if mode == Mode::Mask && (eew != Sew::E8 || fields != 1 || !m.vm) {
        return Err(unsupported());
    }

    let vtype = ctx.active(record)?;
    let multiplier = match mode {
        Mode::Mask => Lmul::M1,
        Mode::Indexed { .. } => vtype.lmul,
        _ => emul(vtype, eew)?,
    };
    let registers = multiplier.registers();
    if u16::from(fields) * u16::from(registers) > 8 {
        return Err(Inconsistency::InvalidMultiplier.into());
    }

    match mode {
        Mode::Strided => effect.read_scalar(m.rs2),
        Mode::Indexed { .. } => {
            let index = emul(vtype, eew)?;
            effect.read_all(group(m.rs2, index.registers())?);
        }
        _ => (),
    }
    if !m.vm {
        effect.read(Location::MASK);
    }
    effect.read(Location::Vl);
    effect.read(Location::Vtype);

    let data = span(m.vd, registers, fields * registers)?;
    if store {
        effect.read_all(data);
        return Ok(effect);
    }
    effect.write_all(data);
    if mode == Mode::FaultOnlyFirst {
        effect.write(Location::Vl);
    }

    let lanes = !m.vm && !(vtype.vma && ctx.mask_agnostic_overwrites);
    let tail = mode != Mode::Mask
        && !vtype.vta
        && (multiplier.is_fractional()
            || matches!((ctx.vl, ctx.vlmax(vtype)), (Some(vl), Some(max)) if vl < max));
    effect.masked = lanes || tail;
    Ok(effect)
}

/// Compute the effective multiplier `EEW / SEW * LMUL`
fn emul(vtype: Vtype, eew: Sew) -> Result<Lmul, Inconsistency> {
    vtype
        .lmul
        .scale(eew.bits(), vtype.sew.bits())
        .ok_or(Inconsistency::InvalidMultiplier)
}

fn mnemonic(op: &str, mode: Mode, eew: Sew, fields: u8, store: bool) -> String {
    let eew = eew.bits();
    let seg = if fields > 1 {
        format!("seg{fields}")
    } else {
        String::new()
    };
    match mode {
        Mode::UnitStride => format!("v{op}{seg}e{eew}.v"),
        Mode::FaultOnlyFirst => format!("v{op}{seg}e{eew}ff.v"),
        Mode::WholeRegister if store => format!("v{op}{fields}r.v"),
        Mode::WholeRegister => format!("v{op}{fields}re{eew}.v"),
        Mode::Mask => format!("v{op}m.v"),
        Mode::Strided => format!("v{op}s{seg}e{eew}.v"),
        Mode::Indexed { ordered } => {
            let order = if ordered { 'o' } else { 'u' };
            format!("v{op}{order}x{seg}ei{eew}.v")
        }
    }
}
