// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Scalar instructions
//!
//! Scalar instructions are decoded only as far as needed to tell which
//! integer and floating point registers they read and write. Reads of the
//! `vl` and `vtype` CSRs are tracked as reads of the respective locations.

use crate::instruction::OpCode;
use crate::instruction::format::{TypeI, TypeR, TypeR4};
use crate::location::{Location, Register};
use crate::trace::Record;

use super::{Class, Effect, Kind};

/// Register file of an operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Reg {
    /// No operand
    N,
    /// Integer register
    X,
    /// Floating point register
    F,
}

use Reg::{F, N, X};

const LOADS: [&str; 8] = ["lb", "lh", "lw", "ld", "lbu", "lhu", "lwu", ""];
const STORES: [&str; 8] = ["sb", "sh", "sw", "sd", "", "", "", ""];
const BRANCHES: [&str; 8] = ["beq", "bne", "", "", "blt", "bge", "bltu", "bgeu"];
const OP_IMM: [&str; 8] = ["addi", "slli", "slti", "sltiu", "xori", "srli", "ori", "andi"];
const FP_LOADS: [&str; 8] = ["", "flh", "flw", "fld", "flq", "", "", ""];
const FP_STORES: [&str; 8] = ["", "fsh", "fsw", "fsd", "fsq", "", "", ""];
const MUL_DIV: [&str; 8] = ["mul", "mulh", "mulhsu", "mulhu", "div", "divu", "rem", "remu"];

/// Decode a 32bit scalar instruction
///
/// Register fields reported in the record take precedence over the encoding.
pub(super) fn decode(opcode: OpCode, insn: u32, record: &Record) -> Result<Effect, Kind> {
    let unsupported = || Kind::UnsupportedInstruction(insn.into());
    let r = TypeR::from(insn);
    let pick = |table: &[&'static str; 8]| {
        Some(table[usize::from(r.funct3)])
            .filter(|n| !n.is_empty())
            .ok_or_else(unsupported)
    };

    let (name, operands) = match opcode {
        OpCode::Lui => ("lui", [X, N, N, N]),
        OpCode::Auipc => ("auipc", [X, N, N, N]),
        OpCode::Jal => ("jal", [X, N, N, N]),
        OpCode::Jalr => ("jalr", [X, X, N, N]),
        OpCode::Load => (pick(&LOADS)?, [X, X, N, N]),
        OpCode::OpImm if r.funct3 == 5 && r.funct7 & 0x20 != 0 => ("srai", [X, X, N, N]),
        OpCode::OpImm => (pick(&OP_IMM)?, [X, X, N, N]),
        OpCode::OpImm32 => (op_imm32(r).ok_or_else(unsupported)?, [X, X, N, N]),
        OpCode::Store => (pick(&STORES)?, [N, X, X, N]),
        OpCode::Branch => (pick(&BRANCHES)?, [N, X, X, N]),
        OpCode::Op => (op(r, false), [X, X, X, N]),
        OpCode::Op32 => (op(r, true), [X, X, X, N]),
        OpCode::Amo => ("amo", [X, X, X, N]),
        OpCode::LoadFp => (pick(&FP_LOADS)?, [F, X, N, N]),
        OpCode::StoreFp => (pick(&FP_STORES)?, [N, X, F, N]),
        OpCode::Madd => ("fmadd", [F, F, F, F]),
        OpCode::Msub => ("fmsub", [F, F, F, F]),
        OpCode::Nmsub => ("fnmsub", [F, F, F, F]),
        OpCode::Nmadd => ("fnmadd", [F, F, F, F]),
        OpCode::OpFp => op_fp(r).ok_or_else(unsupported)?,
        OpCode::MiscMem => ("fence", [N, N, N, N]),
        OpCode::System => return system(TypeI::from(insn)).ok_or_else(unsupported),
        OpCode::OpV | OpCode::Unknown => return Err(unsupported()),
    };

    let registers = [
        record.rd.unwrap_or(r.rd),
        record.rs1.unwrap_or(r.rs1),
        record.rs2.unwrap_or(r.rs2),
        TypeR4::from(insn).rs3,
    ];
    let mut effect = Effect::new(name, Class::Scalar);
    let mut text = Vec::new();
    for (i, (reg, number)) in operands.into_iter().zip(registers).enumerate() {
        let location = match reg {
            N => continue,
            X => {
                text.push(format!("x{number}"));
                Location::scalar(number)
            }
            F => {
                text.push(format!("f{number}"));
                Some(Location::Float(number))
            }
        };
        if i == 0 {
            effect.write_all(location);
        } else {
            effect.read_all(location);
        }
    }
    effect.operands = text.join(", ");
    Ok(effect)
}

/// Decode a compressed instruction from the record's register fields
///
/// Compressed encodings are not decoded. Only the integer registers the
/// tracer reported are taken into account.
pub(super) fn compressed(record: &Record) -> Effect {
    let name = record.mnemonic.as_deref().unwrap_or("c.insn");
    let mut effect = Effect::new(name, Class::Scalar);
    let registers: Vec<Register> = [record.rd, record.rs1, record.rs2]
        .into_iter()
        .flatten()
        .collect();
    effect.operands = registers
        .iter()
        .map(|r| format!("x{r}"))
        .collect::<Vec<_>>()
        .join(", ");
    record.rd.into_iter().for_each(|r| effect.write_scalar(r));
    [record.rs1, record.rs2]
        .into_iter()
        .flatten()
        .for_each(|r| effect.read_scalar(r));
    effect
}

fn op(r: TypeR, word: bool) -> &'static str {
    match (r.funct7, r.funct3, word) {
        (0x01, f, false) => MUL_DIV[usize::from(f)],
        (0x00, 0, false) => "add",
        (0x20, 0, false) => "sub",
        (0x00, 1, false) => "sll",
        (0x00, 2, false) => "slt",
        (0x00, 3, false) => "sltu",
        (0x00, 4, false) => "xor",
        (0x00, 5, false) => "srl",
        (0x20, 5, false) => "sra",
        (0x00, 6, false) => "or",
        (0x00, 7, false) => "and",
        (0x00, 0, true) => "addw",
        (0x20, 0, true) => "subw",
        (0x00, 1, true) => "sllw",
        (0x00, 5, true) => "srlw",
        (0x20, 5, true) => "sraw",
        (0x01, 0, true) => "mulw",
        (0x01, 4, true) => "divw",
        (0x01, 5, true) => "divuw",
        (0x01, 6, true) => "remw",
        (0x01, 7, true) => "remuw",
        // Register-register operations of other extensions
        (_, _, false) => "op",
        (_, _, true) => "op-32",
    }
}

fn op_imm32(r: TypeR) -> Option<&'static str> {
    match (r.funct3, r.funct7 & 0x20 != 0) {
        (0, _) => Some("addiw"),
        (1, false) => Some("slliw"),
        (5, false) => Some("srliw"),
        (5, true) => Some("sraiw"),
        _ => None,
    }
}

fn op_fp(r: TypeR) -> Option<(&'static str, [Reg; 4])> {
    let op = match r.funct7 >> 2 {
        0b00000 => ("fadd", [F, F, F, N]),
        0b00001 => ("fsub", [F, F, F, N]),
        0b00010 => ("fmul", [F, F, F, N]),
        0b00011 => ("fdiv", [F, F, F, N]),
        0b00100 => ("fsgnj", [F, F, F, N]),
        0b00101 if r.funct3 == 0 => ("fmin", [F, F, F, N]),
        0b00101 => ("fmax", [F, F, F, N]),
        0b01000 => ("fcvt.f.f", [F, F, N, N]),
        0b01011 => ("fsqrt", [F, F, N, N]),
        0b10100 if r.funct3 == 2 => ("feq", [X, F, F, N]),
        0b10100 if r.funct3 == 1 => ("flt", [X, F, F, N]),
        0b10100 => ("fle", [X, F, F, N]),
        0b11000 => ("fcvt.x.f", [X, F, N, N]),
        0b11010 => ("fcvt.f.x", [F, X, N, N]),
        0b11100 if r.funct3 == 1 => ("fclass", [X, F, N, N]),
        0b11100 => ("fmv.x.f", [X, F, N, N]),
        0b11110 => ("fmv.f.x", [F, X, N, N]),
        _ => return None,
    };
    Some(op)
}

/// Decode `SYSTEM` instructions
///
/// CSR accesses to `vl` and `vtype` read the respective locations. Both CSRs
/// are read-only, so no CSR access writes them.
fn system(i: TypeI) -> Option<Effect> {
    let name = match i.funct3 {
        0 => {
            let name = match i.imm {
                0 => "ecall",
                1 => "ebreak",
                _ => "system",
            };
            return Some(Effect::new(name, Class::Scalar));
        }
        1 => "csrrw",
        2 => "csrrs",
        3 => "csrrc",
        5 => "csrrwi",
        6 => "csrrsi",
        7 => "csrrci",
        _ => return None,
    };
    let immediate = i.funct3 & 0b100 != 0;
    let csr = match i.imm {
        0xc20 => Some(Location::Vl),
        0xc21 => Some(Location::Vtype),
        _ => None,
    };

    let mut effect = Effect::new(name, Class::Scalar);
    // csrrw(i) with rd = x0 does not read the CSR
    if i.funct3 & 0b11 != 0b01 || i.rd != 0 {
        effect.read_all(csr);
    }
    let source = if immediate {
        i.rs1.to_string()
    } else {
        effect.read_scalar(i.rs1);
        format!("x{}", i.rs1)
    };
    effect.write_scalar(i.rd);
    effect.operands = format!("x{}, {}, {source}", i.rd, csr_name(i.imm));
    Some(effect)
}

fn csr_name(csr: u16) -> String {
    let name = match csr {
        0x008 => "vstart",
        0x009 => "vxsat",
        0x00a => "vxrm",
        0x00f => "vcsr",
        0xc20 => "vl",
        0xc21 => "vtype",
        0xc22 => "vlenb",
        _ => return format!("{csr:#x}"),
    };
    name.into()
}
