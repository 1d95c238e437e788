// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
use super::*;

use format::{TypeV, TypeVMem, TypeVset};
use vtype::{Lmul, Sew, Vtype};

#[test]
fn bits_length() {
    assert_eq!(Bits::try_from(0x4501u64), Ok(Bits::Bit16(0x4501)));
    assert_eq!(Bits::try_from(0x02208457u64), Ok(Bits::Bit32(0x02208457)));
    assert_eq!(Bits::try_from(0x1_0000_4501u64), Err(0x1_0000_4501));
    assert_eq!(Bits::try_from(0x1_0220_8457u64), Err(0x1_0220_8457));
    assert_eq!(Bits::try_from(0x0000_001fu64), Err(0x1f));
}

#[test]
fn opcodes() {
    assert_eq!(OpCode::from(0x02208457), OpCode::OpV);
    assert_eq!(OpCode::from(0x02056407), OpCode::LoadFp);
    assert_eq!(OpCode::from(0x00b50533), OpCode::Op);
    assert_eq!(OpCode::from(0x0000000b), OpCode::Unknown);
}

#[test]
fn type_v() {
    // vadd.vv v8, v4, v2, v0.t
    assert_eq!(
        TypeV::from(0x00410457),
        TypeV {
            vd: 8,
            vs1: 2,
            vs2: 4,
            vm: false,
            funct3: 0,
            funct6: 0,
        }
    );
    let imm = TypeV {
        vd: 0,
        vs1: 0x1f,
        vs2: 0,
        vm: true,
        funct3: 3,
        funct6: 0,
    };
    assert_eq!(imm.simm5(), -1);
    assert_eq!(TypeV { vs1: 0x0f, ..imm }.simm5(), 15);
    assert_eq!(TypeV { vs1: 0x10, ..imm }.simm5(), -16);
}

#[test]
fn type_vset() {
    // vsetvli x5, x10, e32,m4,ta,ma
    assert_eq!(
        TypeVset::try_from(0x0d2572d7),
        Ok(TypeVset::Vsetvli {
            rd: 5,
            rs1: 10,
            zimm: 0xd2,
        })
    );
    // vsetivli x0, 4, e8,m1,tu,mu
    assert_eq!(
        TypeVset::try_from(0xc0027057),
        Ok(TypeVset::Vsetivli {
            rd: 0,
            uimm: 4,
            zimm: 0,
        })
    );
    // vsetvl x1, x2, x3
    assert_eq!(
        TypeVset::try_from(0x803170d7),
        Ok(TypeVset::Vsetvl {
            rd: 1,
            rs1: 2,
            rs2: 3,
        })
    );
    assert_eq!(TypeVset::try_from(0x823170d7), Err(0x823170d7));
}

#[test]
fn type_vmem() {
    // vle32.v v8, (x10)
    assert_eq!(
        TypeVMem::from(0x02056407),
        TypeVMem {
            vd: 8,
            rs1: 10,
            rs2: 0,
            width: 0b110,
            vm: true,
            mop: 0,
            mew: false,
            nf: 0,
        }
    );
}

#[test]
fn vtype_decode() {
    assert_eq!(
        Vtype::try_from(0xd2),
        Ok(Vtype::new(Sew::E32, Lmul::from_registers(4).unwrap(), true, true))
    );
    assert_eq!(Vtype::try_from(1 << 63), Ok(Vtype::ILLEGAL));
    assert_eq!(Vtype::try_from(1 << 31), Ok(Vtype::ILLEGAL));
    assert_eq!(Vtype::try_from(0x04), Err(0x04));
    assert_eq!(Vtype::try_from(0x20), Err(0x20));
    assert_eq!(Vtype::try_from(0x100), Err(0x100));
    assert_eq!(Vtype::from_zimm(0x7ff), Vtype::ILLEGAL);
}

#[test]
fn vtype_bits() {
    for raw in [0x00, 0x07, 0xd2, 0x5b, 0x8d] {
        assert_eq!(Vtype::try_from(raw).map(u64::from), Ok(raw));
    }
    assert_eq!(u64::from(Vtype::ILLEGAL), 1 << 63);
}

#[test]
fn vtype_fmt() {
    assert_eq!(Vtype::from_zimm(0xd2).to_string(), "e32,m4,ta,ma");
    assert_eq!(Vtype::from_zimm(0x07).to_string(), "e8,mf2,tu,mu");
    assert_eq!(Vtype::ILLEGAL.to_string(), "vill");
}

#[test]
fn vlmax() {
    assert_eq!(Vtype::from_zimm(0xd2).vlmax(128), 16);
    assert_eq!(Vtype::from_zimm(0x07).vlmax(128), 8);
    assert_eq!(Vtype::from_zimm(0x18).vlmax(256), 4);
}

#[test]
fn lmul_scale() {
    let m1 = Lmul::M1;
    assert_eq!(m1.scale(2, 1), Lmul::from_registers(2));
    assert_eq!(m1.scale(1, 8).map(Lmul::registers), Some(1));
    assert_eq!(m1.scale(1, 16), None);
    assert_eq!(Lmul::from_registers(8).and_then(|l| l.scale(2, 1)), None);
    assert_eq!(Lmul::from_vlmul(4), None);
    assert!(Lmul::from_vlmul(6).unwrap().is_fractional());
    assert_eq!(Lmul::from_vlmul(6).unwrap().to_string(), "mf4");
}
