// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use strum::{Display, EnumIter, FromRepr};

/// The 16-bit instruction codes understood by the VM.
///
/// Operators live in the `0x8000` range. The three literal pushes use their own high bits and
/// carry a 4-byte big-endian operand directly after the opcode.
#[repr(u16)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr, EnumIter, Display)]
pub enum Opcode {
    Noop = 0x8000,
    CriticalStart = 0x8002,
    CriticalDone = 0x8003,
    Jump = 0x8004,
    Call = 0x8005,
    ReturnToData = 0x800C,
    DataToReturn = 0x800D,
    ExitProg = 0x8010,
    FetchGlobal = 0x8012,
    StoreGlobal = 0x8013,
    FetchExternal = 0x8014,
    StoreExternal = 0x8015,
    ExportVar = 0x8016,
    Swap = 0x8018,
    Pop = 0x801A,
    Dup = 0x801B,
    Return = 0x801C,
    Exit = 0x801D,
    CheckArgCount = 0x8027,
    LookupStringProc = 0x8028,
    PopBase = 0x8029,
    PopToBase = 0x802A,
    PushBase = 0x802B,
    SetGlobal = 0x802C,
    If = 0x802F,
    While = 0x8030,
    Store = 0x8031,
    Fetch = 0x8032,
    Eq = 0x8033,
    Ne = 0x8034,
    Le = 0x8035,
    Ge = 0x8036,
    Lt = 0x8037,
    Gt = 0x8038,
    Add = 0x8039,
    Sub = 0x803A,
    Mul = 0x803B,
    Div = 0x803C,
    Mod = 0x803D,
    And = 0x803E,
    Or = 0x803F,
    BitAnd = 0x8040,
    BitOr = 0x8041,
    BitXor = 0x8042,
    BitNot = 0x8043,
    Floor = 0x8044,
    Not = 0x8045,
    Negate = 0x8046,
    Concat = 0x8047,
    GiveExpPoints = 0x80A1,
    PlaySfx = 0x80A3,
    ObjName = 0x80A4,
    Random = 0x80B4,
    DisplayMsg = 0x80B8,
    ScriptOverrides = 0x80B9,
    SelfObj = 0x80BC,
    SourceObj = 0x80BD,
    TargetObj = 0x80BE,
    DudeObj = 0x80BF,
    LocalVar = 0x80C1,
    SetLocalVar = 0x80C2,
    MapVar = 0x80C3,
    SetMapVar = 0x80C4,
    GlobalVar = 0x80C5,
    SetGlobalVar = 0x80C6,
    ObjType = 0x80C8,
    GetCritterStat = 0x80CA,
    SetCritterStat = 0x80CB,
    FixedParam = 0x80F6,
    MessageStr = 0x8105,
    MessageSpeech = 0x8106,
    UsedSkill = 0x8110,
    PlayMovie = 0x8115,
    CallScriptProcedure = 0x8120,
    PushString = 0x9001,
    PushFloat = 0xA001,
    PushInt = 0xC001,
}

impl Opcode {
    pub fn decode(raw: u16) -> Option<Opcode> {
        Opcode::from_repr(raw)
    }

    pub fn code(self) -> u16 {
        self as u16
    }

    /// Number of inline operand bytes following the opcode in the code stream.
    pub fn operand_size(self) -> usize {
        match self {
            Opcode::PushInt | Opcode::PushFloat | Opcode::PushString => 4,
            _ => 0,
        }
    }
}
