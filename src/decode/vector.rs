// Copyright (C) 2025 FZI Forschungszentrum Informatik
// SPDX-License-Identifier: Apache-2.0
//! Vector arithmetic instructions (`OP-V`)
//!
//! Instructions are looked up in per-category tables keyed by `funct6`. Each
//! entry names the operation and its [`Shape`], which determines the
//! effective multiplier of every operand relative to `LMUL`.

use crate::instruction::format::TypeV;
use crate::instruction::vtype::{Lmul, Sew, Vtype};
use crate::location::{Location, Register};
use crate::trace::Record;

use super::{Class, Context, Effect, Inconsistency, Kind, group};

/// Forms an operation is available in
const V: u8 = 0b001;
/// Scalar (integer or floating point) form
const X: u8 = 0b010;
const I: u8 = 0b100;

pub(super) fn decode(insn: u32, record: &Record, ctx: &mut Context) -> Result<Effect, Kind> {
    let v = TypeV::from(insn);
    let unsupported = || Kind::UnsupportedInstruction(insn.into());
    let (category, source) = match v.funct3 {
        0b000 => (Category::Opi, Source::Vector),
        0b001 => (Category::Opf, Source::Vector),
        0b010 => (Category::Opm, Source::Vector),
        0b011 => (Category::Opi, Source::Immediate),
        0b100 => (Category::Opi, Source::Scalar),
        0b101 => (Category::Opf, Source::Float),
        0b110 => (Category::Opm, Source::Scalar),
        _ => return Err(unsupported()),
    };

    if category == Category::Opi && source == Source::Immediate && v.funct6 == 0b100111 {
        return whole_move(v, insn);
    }

    let (name, shape) = lookup(category, source, &v).ok_or_else(unsupported)?;
    let vtype = ctx.active(record)?;
    let layout = shape.layout(vtype, v.vm)?;
    let reserved = match layout.mask {
        Mask::Carry { required } => required && v.vm,
        Mask::Unmasked => !v.vm,
        _ => false,
    };
    if reserved {
        return Err(unsupported());
    }

    let mut effect = Effect::new(shape.mnemonic(name, source, v.vm), shape.class());
    effect.operands = operands(&v, source, shape, &layout, name);

    if let Some(operand) = layout.src1 {
        match source {
            Source::Vector => effect.read_all(operand.locations(v.vs1)?),
            Source::Scalar => effect.read_scalar(v.vs1),
            Source::Float => effect.read(Location::Float(v.vs1)),
            Source::Immediate => (),
        }
    }
    if let Some(operand) = layout.vs2 {
        effect.read_all(operand.locations(v.vs2)?);
    }

    let mut lanes = false;
    if !v.vm {
        effect.read(Location::MASK);
        lanes = layout.mask == Mask::Predicate && !(vtype.vma && ctx.mask_agnostic_overwrites);
    }
    if layout.vl {
        effect.read(Location::Vl);
    }
    effect.read(Location::Vtype);

    match layout.dest {
        Dest::Scalar => effect.write_scalar(v.vd),
        Dest::Float => effect.write(Location::Float(v.vd)),
        Dest::Vector(operand) => {
            // Elements below the offset of a slide up are left in place
            if layout.accumulate || layout.slide_up {
                effect.read_all(operand.locations(v.vd)?);
            }
            effect.write_all(operand.locations(v.vd)?);
            effect.masked = lanes || layout.slide_up || layout.tail.is_kept(vtype, ctx);
        }
    }
    Ok(effect)
}

/// `vmv<nr>r.v`, which ignores `vl` and `vtype`
fn whole_move(v: TypeV, insn: u32) -> Result<Effect, Kind> {
    let registers = u8::try_from(v.simm5() + 1)
        .ok()
        .filter(|r| v.vm && Lmul::from_registers(*r).is_some())
        .ok_or(Kind::UnsupportedInstruction(insn.into()))?;
    let mut effect = Effect::new(format!("vmv{registers}r.v"), Class::Arithmetic);
    effect.operands = format!("v{}, v{}", v.vd, v.vs2);
    effect.read_all(group(v.vs2, registers)?);
    effect.write_all(group(v.vd, registers)?);
    Ok(effect)
}

/// Operation category, selected by `funct3`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Category {
    /// Integer operations
    Opi,
    /// Integer multiply/divide, reductions and mask operations
    Opm,
    /// Floating point operations
    Opf,
}

/// Kind of the first source operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Source {
    Vector,
    Scalar,
    Float,
    Immediate,
}

impl Source {
    fn form(self) -> u8 {
        match self {
            Self::Vector => V,
            Self::Scalar | Self::Float => X,
            Self::Immediate => I,
        }
    }

    fn letter(self) -> char {
        match self {
            Self::Vector => 'v',
            Self::Scalar => 'x',
            Self::Float => 'f',
            Self::Immediate => 'i',
        }
    }
}

/// Operand shape of an operation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shape {
    /// `vd`, `vs2` and `vs1` all at `LMUL`
    Single,
    /// `2*SEW` result from `SEW` operands
    Widening,
    /// `2*SEW` result from a `2*SEW` and a `SEW` operand
    WideningWide,
    /// `SEW` result from a `2*SEW` and a `SEW` operand
    Narrowing,
    /// Multiply-add overwriting the addend `vd`
    MulAdd,
    WideningMulAdd,
    /// Mask result from `SEW` operands
    Compare,
    /// Scalar result in element 0 of `vd`, scalar operand in `vs1`
    Reduction,
    WideningReduction,
    MaskLogical,
    /// Add or subtract with carry/borrow input in `v0`
    CarryIn,
    /// Carry/borrow output into a mask
    CarryOut,
    Merge,
    Gather,
    /// Gather with 16bit indices
    GatherEi16,
    /// Slide leaving elements below the offset undisturbed
    SlideUp,
    Slide,
    Compress,
    /// Unary operation, `vs1` selects the operation
    Unary,
    WideningUnary,
    NarrowingUnary,
    /// Integer extension by the given factor
    Extend(u16),
    /// Move element 0 to an integer register
    ToScalar,
    /// Move element 0 to a floating point register
    ToFloat,
    /// Move a scalar into element 0
    FromScalar,
    /// Scalar result computed from a mask
    MaskCount,
    /// Mask result computed from a mask
    MaskSet,
    Iota,
    Id,
}

impl Shape {
    fn is_unary(self) -> bool {
        matches!(
            self,
            Self::Unary
                | Self::WideningUnary
                | Self::NarrowingUnary
                | Self::Extend(_)
                | Self::ToScalar
                | Self::ToFloat
                | Self::FromScalar
                | Self::MaskCount
                | Self::MaskSet
                | Self::Iota
                | Self::Id
        )
    }

    fn class(self) -> Class {
        match self {
            Self::Compare | Self::CarryOut => Class::MaskCompare,
            Self::Reduction | Self::WideningReduction => Class::Reduction,
            Self::MaskLogical | Self::MaskCount | Self::MaskSet => Class::Mask,
            Self::Gather | Self::GatherEi16 | Self::SlideUp | Self::Slide | Self::Compress => {
                Class::Permute
            }
            _ => Class::Arithmetic,
        }
    }

    fn mnemonic(self, name: &str, source: Source, vm: bool) -> String {
        let s = source.letter();
        match self {
            _ if self.is_unary() => name.into(),
            Self::Reduction | Self::WideningReduction => format!("{name}.vs"),
            Self::MaskLogical => format!("{name}.mm"),
            Self::Compress => format!("{name}.vm"),
            Self::WideningWide | Self::Narrowing => format!("{name}.w{s}"),
            Self::CarryIn => format!("{name}.v{s}m"),
            Self::CarryOut if !vm => format!("{name}.v{s}m"),
            Self::Merge if vm && source == Source::Float => "vfmv.v.f".into(),
            Self::Merge if vm => format!("vmv.v.{s}"),
            Self::Merge => format!("{name}.v{s}m"),
            _ => format!("{name}.v{s}"),
        }
    }

    /// Determine the operand layout under the given `vtype`
    fn layout(self, vtype: Vtype, vm: bool) -> Result<Layout, Inconsistency> {
        let lmul = vtype.lmul;
        let group = Operand::Group(lmul);
        let wide = || {
            if vtype.sew.bits() > 32 {
                return Err(Inconsistency::InvalidMultiplier);
            }
            lmul.scale(2, 1)
                .map(Operand::Group)
                .ok_or(Inconsistency::InvalidMultiplier)
        };
        let base = Layout {
            dest: Dest::Vector(group),
            accumulate: false,
            vs2: Some(group),
            src1: Some(group),
            mask: Mask::Predicate,
            tail: Tail::Body(lmul),
            slide_up: false,
            vl: true,
        };
        let mask_dest = Layout {
            dest: Dest::Vector(Operand::Single),
            tail: Tail::Never,
            ..base
        };
        let unary = Layout { src1: None, ..base };

        let layout = match self {
            Self::Single | Self::Gather | Self::Slide => base,
            Self::Widening => Layout {
                dest: Dest::Vector(wide()?),
                tail: Tail::Body(wide()?.lmul()),
                ..base
            },
            Self::WideningWide => Layout {
                dest: Dest::Vector(wide()?),
                vs2: Some(wide()?),
                tail: Tail::Body(wide()?.lmul()),
                ..base
            },
            Self::Narrowing => Layout {
                vs2: Some(wide()?),
                ..base
            },
            Self::MulAdd => Layout {
                accumulate: true,
                ..base
            },
            Self::WideningMulAdd => Layout {
                dest: Dest::Vector(wide()?),
                accumulate: true,
                tail: Tail::Body(wide()?.lmul()),
                ..base
            },
            Self::Compare => mask_dest,
            Self::Reduction | Self::WideningReduction => {
                if self == Self::WideningReduction && vtype.sew.bits() > 32 {
                    return Err(Inconsistency::InvalidMultiplier);
                }
                Layout {
                    dest: Dest::Vector(Operand::Single),
                    src1: Some(Operand::Single),
                    tail: Tail::Always,
                    ..base
                }
            }
            Self::MaskLogical => Layout {
                vs2: Some(Operand::Single),
                src1: Some(Operand::Single),
                mask: Mask::Unmasked,
                ..mask_dest
            },
            Self::CarryIn => Layout {
                mask: Mask::Carry { required: true },
                ..base
            },
            Self::CarryOut => Layout {
                mask: Mask::Carry { required: false },
                ..mask_dest
            },
            Self::Merge => Layout {
                vs2: (!vm).then_some(group),
                mask: Mask::Merge,
                ..base
            },
            Self::GatherEi16 => {
                let index = lmul
                    .scale(16, vtype.sew.bits())
                    .ok_or(Inconsistency::InvalidMultiplier)?;
                Layout {
                    src1: Some(Operand::Group(index)),
                    ..base
                }
            }
            Self::SlideUp => Layout {
                slide_up: true,
                ..base
            },
            Self::Compress => Layout {
                src1: Some(Operand::Single),
                mask: Mask::Unmasked,
                tail: Tail::Always,
                ..base
            },
            Self::Unary => unary,
            Self::WideningUnary => Layout {
                dest: Dest::Vector(wide()?),
                tail: Tail::Body(wide()?.lmul()),
                ..unary
            },
            Self::NarrowingUnary => Layout {
                vs2: Some(wide()?),
                ..unary
            },
            Self::Extend(factor) => {
                let sew = vtype.sew.bits();
                if sew / factor < Sew::E8.bits() {
                    return Err(Inconsistency::InvalidMultiplier);
                }
                let source = lmul
                    .scale(1, factor)
                    .ok_or(Inconsistency::InvalidMultiplier)?;
                Layout {
                    vs2: Some(Operand::Group(source)),
                    ..unary
                }
            }
            Self::ToScalar | Self::ToFloat => Layout {
                dest: if self == Self::ToScalar {
                    Dest::Scalar
                } else {
                    Dest::Float
                },
                vs2: Some(Operand::Single),
                mask: Mask::Unmasked,
                tail: Tail::Never,
                vl: false,
                ..unary
            },
            Self::FromScalar => Layout {
                dest: Dest::Vector(Operand::Single),
                vs2: None,
                src1: Some(Operand::Single),
                mask: Mask::Unmasked,
                tail: Tail::Always,
                ..base
            },
            Self::MaskCount => Layout {
                dest: Dest::Scalar,
                vs2: Some(Operand::Single),
                ..unary
            },
            Self::MaskSet => Layout {
                vs2: Some(Operand::Single),
                src1: None,
                ..mask_dest
            },
            Self::Iota => Layout {
                vs2: Some(Operand::Single),
                ..unary
            },
            Self::Id => Layout { vs2: None, ..unary },
        };
        Ok(layout)
    }
}

/// Operand layout of a single instruction
#[derive(Copy, Clone, Debug)]
struct Layout {
    dest: Dest,
    /// Whether the destination is also read
    accumulate: bool,
    vs2: Option<Operand>,
    /// Operand in the `vs1`/`rs1`/`imm` field
    src1: Option<Operand>,
    mask: Mask,
    tail: Tail,
    /// Whether elements below the slide offset are left undisturbed
    slide_up: bool,
    /// Whether `vl` is read
    vl: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Dest {
    Vector(Operand),
    Scalar,
    Float,
}

/// Vector register operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Operand {
    /// Register group with the given effective multiplier
    Group(Lmul),
    /// Single register, e.g. a mask or a scalar element
    Single,
}

impl Operand {
    fn lmul(self) -> Lmul {
        match self {
            Self::Group(lmul) => lmul,
            Self::Single => Lmul::M1,
        }
    }

    fn locations(
        self,
        register: Register,
    ) -> Result<impl Iterator<Item = Location>, Inconsistency> {
        group(register, self.lmul().registers())
    }
}

/// Role of `v0` when `vm` is clear
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mask {
    /// `v0` predicates which elements are written
    Predicate,
    /// `v0` supplies carry or borrow inputs
    Carry { required: bool },
    /// `v0` selects between the sources
    Merge,
    /// Masked encodings are reserved
    Unmasked,
}

/// Which tail elements of the destination may be left undisturbed
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Tail {
    /// No tail elements are preserved
    Never,
    /// Elements past element 0 (or past the packed elements) form the tail
    Always,
    /// Elements past `vl` in a group with the given multiplier form the tail
    Body(Lmul),
}

impl Tail {
    /// Check whether tail elements stay undisturbed
    fn is_kept(self, vtype: Vtype, ctx: &Context) -> bool {
        if vtype.vta {
            return false;
        }
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Body(lmul) => {
                lmul.is_fractional()
                    || matches!((ctx.vl, ctx.vlmax(vtype)), (Some(vl), Some(max)) if vl < max)
            }
        }
    }
}

fn lookup(category: Category, source: Source, v: &TypeV) -> Option<(&'static str, Shape)> {
    use Shape::*;

    let (name, shape, forms) = match (category, v.funct6) {
        (Category::Opi, 0b001110) if source == Source::Vector => ("vrgatherei16", GatherEi16, V),
        (Category::Opi, funct6) => opi(funct6)?,
        (Category::Opm, 0b010000) => return move_scalar(source, v.vs1, v.vs2),
        (Category::Opm, 0b010010) if source == Source::Vector => return extend(v.vs1),
        (Category::Opm, 0b010100) if source == Source::Vector => return mask_unary(v),
        (Category::Opm, funct6) => opm(funct6)?,
        (Category::Opf, 0b010000) => return move_float(source, v.vs1, v.vs2),
        (Category::Opf, 0b010010) if source == Source::Vector => return convert(v.vs1),
        (Category::Opf, 0b010011) if source == Source::Vector => return float_unary(v.vs1),
        (Category::Opf, funct6) => opf(funct6)?,
    };
    (forms & source.form() != 0).then_some((name, shape))
}

fn opi(funct6: u8) -> Option<(&'static str, Shape, u8)> {
    use Shape::*;

    let op = match funct6 {
        0b000000 => ("vadd", Single, V | X | I),
        0b000010 => ("vsub", Single, V | X),
        0b000011 => ("vrsub", Single, X | I),
        0b000100 => ("vminu", Single, V | X),
        0b000101 => ("vmin", Single, V | X),
        0b000110 => ("vmaxu", Single, V | X),
        0b000111 => ("vmax", Single, V | X),
        0b001001 => ("vand", Single, V | X | I),
        0b001010 => ("vor", Single, V | X | I),
        0b001011 => ("vxor", Single, V | X | I),
        0b001100 => ("vrgather", Gather, V | X | I),
        0b001110 => ("vslideup", SlideUp, X | I),
        0b001111 => ("vslidedown", Slide, X | I),
        0b010000 => ("vadc", CarryIn, V | X | I),
        0b010001 => ("vmadc", CarryOut, V | X | I),
        0b010010 => ("vsbc", CarryIn, V | X),
        0b010011 => ("vmsbc", CarryOut, V | X),
        0b010111 => ("vmerge", Merge, V | X | I),
        0b011000 => ("vmseq", Compare, V | X | I),
        0b011001 => ("vmsne", Compare, V | X | I),
        0b011010 => ("vmsltu", Compare, V | X),
        0b011011 => ("vmslt", Compare, V | X),
        0b011100 => ("vmsleu", Compare, V | X | I),
        0b011101 => ("vmsle", Compare, V | X | I),
        0b011110 => ("vmsgtu", Compare, X | I),
        0b011111 => ("vmsgt", Compare, X | I),
        0b100000 => ("vsaddu", Single, V | X | I),
        0b100001 => ("vsadd", Single, V | X | I),
        0b100010 => ("vssubu", Single, V | X),
        0b100011 => ("vssub", Single, V | X),
        0b100101 => ("vsll", Single, V | X | I),
        0b100111 => ("vsmul", Single, V | X),
        0b101000 => ("vsrl", Single, V | X | I),
        0b101001 => ("vsra", Single, V | X | I),
        0b101010 => ("vssrl", Single, V | X | I),
        0b101011 => ("vssra", Single, V | X | I),
        0b101100 => ("vnsrl", Narrowing, V | X | I),
        0b101101 => ("vnsra", Narrowing, V | X | I),
        0b101110 => ("vnclipu", Narrowing, V | X | I),
        0b101111 => ("vnclip", Narrowing, V | X | I),
        0b110000 => ("vwredsumu", WideningReduction, V),
        0b110001 => ("vwredsum", WideningReduction, V),
        _ => return None,
    };
    Some(op)
}

fn opm(funct6: u8) -> Option<(&'static str, Shape, u8)> {
    use Shape::*;

    let op = match funct6 {
        0b000000 => ("vredsum", Reduction, V),
        0b000001 => ("vredand", Reduction, V),
        0b000010 => ("vredor", Reduction, V),
        0b000011 => ("vredxor", Reduction, V),
        0b000100 => ("vredminu", Reduction, V),
        0b000101 => ("vredmin", Reduction, V),
        0b000110 => ("vredmaxu", Reduction, V),
        0b000111 => ("vredmax", Reduction, V),
        0b001000 => ("vaaddu", Single, V | X),
        0b001001 => ("vaadd", Single, V | X),
        0b001010 => ("vasubu", Single, V | X),
        0b001011 => ("vasub", Single, V | X),
        0b001110 => ("vslide1up", Slide, X),
        0b001111 => ("vslide1down", Slide, X),
        0b010111 => ("vcompress", Compress, V),
        0b011000 => ("vmandn", MaskLogical, V),
        0b011001 => ("vmand", MaskLogical, V),
        0b011010 => ("vmor", MaskLogical, V),
        0b011011 => ("vmxor", MaskLogical, V),
        0b011100 => ("vmorn", MaskLogical, V),
        0b011101 => ("vmnand", MaskLogical, V),
        0b011110 => ("vmnor", MaskLogical, V),
        0b011111 => ("vmxnor", MaskLogical, V),
        0b100000 => ("vdivu", Single, V | X),
        0b100001 => ("vdiv", Single, V | X),
        0b100010 => ("vremu", Single, V | X),
        0b100011 => ("vrem", Single, V | X),
        0b100100 => ("vmulhu", Single, V | X),
        0b100101 => ("vmul", Single, V | X),
        0b100110 => ("vmulhsu", Single, V | X),
        0b100111 => ("vmulh", Single, V | X),
        0b101001 => ("vmadd", MulAdd, V | X),
        0b101011 => ("vnmsub", MulAdd, V | X),
        0b101101 => ("vmacc", MulAdd, V | X),
        0b101111 => ("vnmsac", MulAdd, V | X),
        0b110000 => ("vwaddu", Widening, V | X),
        0b110001 => ("vwadd", Widening, V | X),
        0b110010 => ("vwsubu", Widening, V | X),
        0b110011 => ("vwsub", Widening, V | X),
        0b110100 => ("vwaddu", WideningWide, V | X),
        0b110101 => ("vwadd", WideningWide, V | X),
        0b110110 => ("vwsubu", WideningWide, V | X),
        0b110111 => ("vwsub", WideningWide, V | X),
        0b111000 => ("vwmulu", Widening, V | X),
        0b111010 => ("vwmulsu", Widening, V | X),
        0b111011 => ("vwmul", Widening, V | X),
        0b111100 => ("vwmaccu", WideningMulAdd, V | X),
        0b111101 => ("vwmacc", WideningMulAdd, V | X),
        0b111110 => ("vwmaccus", WideningMulAdd, X),
        0b111111 => ("vwmaccsu", WideningMulAdd, V | X),
        _ => return None,
    };
    Some(op)
}

fn opf(funct6: u8) -> Option<(&'static str, Shape, u8)> {
    use Shape::*;

    let op = match funct6 {
        0b000000 => ("vfadd", Single, V | X),
        0b000001 => ("vfredusum", Reduction, V),
        0b000010 => ("vfsub", Single, V | X),
        0b000011 => ("vfredosum", Reduction, V),
        0b000100 => ("vfmin", Single, V | X),
        0b000101 => ("vfredmin", Reduction, V),
        0b000110 => ("vfmax", Single, V | X),
        0b000111 => ("vfredmax", Reduction, V),
        0b001000 => ("vfsgnj", Single, V | X),
        0b001001 => ("vfsgnjn", Single, V | X),
        0b001010 => ("vfsgnjx", Single, V | X),
        0b001110 => ("vfslide1up", Slide, X),
        0b001111 => ("vfslide1down", Slide, X),
        0b010111 => ("vfmerge", Merge, X),
        0b011000 => ("vmfeq", Compare, V | X),
        0b011001 => ("vmfle", Compare, V | X),
        0b011011 => ("vmflt", Compare, V | X),
        0b011100 => ("vmfne", Compare, V | X),
        0b011101 => ("vmfgt", Compare, X),
        0b011111 => ("vmfge", Compare, X),
        0b100000 => ("vfdiv", Single, V | X),
        0b100001 => ("vfrdiv", Single, X),
        0b100100 => ("vfmul", Single, V | X),
        0b100111 => ("vfrsub", Single, X),
        0b101000 => ("vfmadd", MulAdd, V | X),
        0b101001 => ("vfnmadd", MulAdd, V | X),
        0b101010 => ("vfmsub", MulAdd, V | X),
        0b101011 => ("vfnmsub", MulAdd, V | X),
        0b101100 => ("vfmacc", MulAdd, V | X),
        0b101101 => ("vfnmacc", MulAdd, V | X),
        0b101110 => ("vfmsac", MulAdd, V | X),
        0b101111 => ("vfnmsac", MulAdd, V | X),
        0b110000 => ("vfwadd", Widening, V | X),
        0b110001 => ("vfwredusum", WideningReduction, V),
        0b110010 => ("vfwsub", Widening, V | X),
        0b110011 => ("vfwredosum", WideningReduction, V),
        0b110100 => ("vfwadd", WideningWide, V | X),
        0b110110 => ("vfwsub", WideningWide, V | X),
        0b111000 => ("vfwmul", Widening, V | X),
        0b111100 => ("vfwmacc", WideningMulAdd, V | X),
        0b111101 => ("vfwnmacc", WideningMulAdd, V | X),
        0b111110 => ("vfwmsac", WideningMulAdd, V | X),
        0b111111 => ("vfwnmsac", WideningMulAdd, V | X),
        _ => return None,
    };
    Some(op)
}

/// `VWXUNARY0` and `VRXUNARY0`
fn move_scalar(source: Source, vs1: Register, vs2: Register) -> Option<(&'static str, Shape)> {
    match (source, vs1, vs2) {
        (Source::Vector, 0b00000, _) => Some(("vmv.x.s", Shape::ToScalar)),
        (Source::Vector, 0b10000, _) => Some(("vcpop.m", Shape::MaskCount)),
        (Source::Vector, 0b10001, _) => Some(("vfirst.m", Shape::MaskCount)),
        (Source::Scalar, _, 0) => Some(("vmv.s.x", Shape::FromScalar)),
        _ => None,
    }
}

/// `VWFUNARY0` and `VRFUNARY0`
fn move_float(source: Source, vs1: Register, vs2: Register) -> Option<(&'static str, Shape)> {
    match (source, vs1, vs2) {
        (Source::Vector, 0, _) => Some(("vfmv.f.s", Shape::ToFloat)),
        (Source::Float, _, 0) => Some(("vfmv.s.f", Shape::FromScalar)),
        _ => None,
    }
}

/// `VXUNARY0`
fn extend(vs1: Register) -> Option<(&'static str, Shape)> {
    let op = match vs1 {
        0b00010 => ("vzext.vf8", Shape::Extend(8)),
        0b00011 => ("vsext.vf8", Shape::Extend(8)),
        0b00100 => ("vzext.vf4", Shape::Extend(4)),
        0b00101 => ("vsext.vf4", Shape::Extend(4)),
        0b00110 => ("vzext.vf2", Shape::Extend(2)),
        0b00111 => ("vsext.vf2", Shape::Extend(2)),
        _ => return None,
    };
    Some(op)
}

/// `VMUNARY0`
fn mask_unary(v: &TypeV) -> Option<(&'static str, Shape)> {
    let op = match v.vs1 {
        0b00001 => ("vmsbf.m", Shape::MaskSet),
        0b00010 => ("vmsof.m", Shape::MaskSet),
        0b00011 => ("vmsif.m", Shape::MaskSet),
        0b10000 => ("viota.m", Shape::Iota),
        0b10001 if v.vs2 == 0 => ("vid.v", Shape::Id),
        _ => return None,
    };
    Some(op)
}

/// `VFUNARY0`
fn convert(vs1: Register) -> Option<(&'static str, Shape)> {
    use Shape::*;

    let op = match vs1 {
        0b00000 => ("vfcvt.xu.f.v", Unary),
        0b00001 => ("vfcvt.x.f.v", Unary),
        0b00010 => ("vfcvt.f.xu.v", Unary),
        0b00011 => ("vfcvt.f.x.v", Unary),
        0b00110 => ("vfcvt.rtz.xu.f.v", Unary),
        0b00111 => ("vfcvt.rtz.x.f.v", Unary),
        0b01000 => ("vfwcvt.xu.f.v", WideningUnary),
        0b01001 => ("vfwcvt.x.f.v", WideningUnary),
        0b01010 => ("vfwcvt.f.xu.v", WideningUnary),
        0b01011 => ("vfwcvt.f.x.v", WideningUnary),
        0b01100 => ("vfwcvt.f.f.v", WideningUnary),
        0b01110 => ("vfwcvt.rtz.xu.f.v", WideningUnary),
        0b01111 => ("vfwcvt.rtz.x.f.v", WideningUnary),
        0b10000 => ("vfncvt.xu.f.w", NarrowingUnary),
        0b10001 => ("vfncvt.x.f.w", NarrowingUnary),
        0b10010 => ("vfncvt.f.xu.w", NarrowingUnary),
        0b10011 => ("vfncvt.f.x.w", NarrowingUnary),
        0b10100 => ("vfncvt.f.f.w", NarrowingUnary),
        0b10101 => ("vfncvt.rod.f.f.w", NarrowingUnary),
        0b10110 => ("vfncvt.rtz.xu.f.w", NarrowingUnary),
        0b10111 => ("vfncvt.rtz.x.f.w", NarrowingUnary),
        _ => return None,
    };
    Some(op)
}

/// `VFUNARY1`
fn float_unary(vs1: Register) -> Option<(&'static str, Shape)> {
    let name = match vs1 {
        0b00000 => "vfsqrt.v",
        0b00100 => "vfrsqrt7.v",
        0b00101 => "vfrec7.v",
        0b10000 => "vfclass.v",
        _ => return None,
    };
    Some((name, Shape::Unary))
}

/// Format operands in assembly syntax
fn operands(v: &TypeV, source: Source, shape: Shape, layout: &Layout, name: &str) -> String {
    let dest = match layout.dest {
        Dest::Scalar => format!("x{}", v.vd),
        Dest::Float => format!("f{}", v.vd),
        Dest::Vector(_) => format!("v{}", v.vd),
    };
    let src1 = layout.src1.map(|_| match source {
        Source::Vector => format!("v{}", v.vs1),
        Source::Scalar => format!("x{}", v.vs1),
        Source::Float => format!("f{}", v.vs1),
        Source::Immediate if unsigned_immediate(name) => v.vs1.to_string(),
        Source::Immediate => v.simm5().to_string(),
    });
    let vs2 = layout.vs2.map(|_| format!("v{}", v.vs2));

    let mut ops = vec![dest];
    if matches!(shape, Shape::MulAdd | Shape::WideningMulAdd) {
        ops.extend(src1);
        ops.extend(vs2);
    } else {
        ops.extend(vs2);
        ops.extend(src1);
    }
    match layout.mask {
        _ if v.vm => (),
        Mask::Predicate => ops.push("v0.t".into()),
        _ => ops.push("v0".into()),
    }
    ops.join(", ")
}

/// Check whether an operation takes an unsigned immediate
fn unsigned_immediate(name: &str) -> bool {
    matches!(
        name,
        "vsll"
            | "vsrl"
            | "vsra"
            | "vssrl"
            | "vssra"
            | "vnsrl"
            | "vnsra"
            | "vnclipu"
            | "vnclip"
            | "vrgather"
            | "vslideup"
            | "vslidedown"
    )
}
