//! GL842 register addresses and bit fields.
//!
//! Multi-byte fields are big-endian over consecutive addresses, use
//! [`crate::register::RegisterSet::set16`] and
//! [`crate::register::RegisterSet::set24`] on the first address.

pub const REG_0X01: u16 = 0x01;
pub const REG_0X01_CISSET: u8 = 0x80;
pub const REG_0X01_DOGENB: u8 = 0x40;
pub const REG_0X01_DVDSET: u8 = 0x20;
pub const REG_0X01_STAGGER: u8 = 0x10;
pub const REG_0X01_COMPENB: u8 = 0x08;
pub const REG_0X01_TRUEGRAY: u8 = 0x04;
pub const REG_0X01_SHDAREA: u8 = 0x02;
pub const REG_0X01_SCAN: u8 = 0x01;

pub const REG_0X02: u16 = 0x02;
pub const REG_0X02_NOTHOME: u8 = 0x80;
pub const REG_0X02_ACDCDIS: u8 = 0x40;
pub const REG_0X02_AGOHOME: u8 = 0x20;
pub const REG_0X02_MTRPWR: u8 = 0x10;
pub const REG_0X02_FASTFED: u8 = 0x08;
pub const REG_0X02_MTRREV: u8 = 0x04;
pub const REG_0X02_HOMENEG: u8 = 0x02;
pub const REG_0X02_LONGCURV: u8 = 0x01;

pub const REG_0X03: u16 = 0x03;
pub const REG_0X03_LAMPDOG: u8 = 0x80;
pub const REG_0X03_AVEENB: u8 = 0x40;
pub const REG_0X03_XPASEL: u8 = 0x20;
pub const REG_0X03_LAMPPWR: u8 = 0x10;
pub const REG_0X03_LAMPTIM: u8 = 0x0f;

pub const REG_0X04: u16 = 0x04;
pub const REG_0X04_LINEART: u8 = 0x80;
pub const REG_0X04_BITSET: u8 = 0x40;
pub const REG_0X04_AFEMOD: u8 = 0x30;
pub const REG_0X04_FILTER: u8 = 0x0c;
pub const REG_0X04_FESET: u8 = 0x03;
pub const REG_0X04_FILTER_RED: u8 = 0x14;
pub const REG_0X04_FILTER_GREEN: u8 = 0x18;
pub const REG_0X04_FILTER_BLUE: u8 = 0x1c;
pub const REG_0X04_LAYOUT_WOLFSON: u8 = 0x10;
pub const REG_0X04_LAYOUT_ANALOG_DEVICES: u8 = 0x20;

pub const REG_0X05: u16 = 0x05;
pub const REG_0X05_DPIHW: u8 = 0xc0;
pub const REG_0X05_DPIHW_600: u8 = 0x00;
pub const REG_0X05_DPIHW_1200: u8 = 0x40;
pub const REG_0X05_DPIHW_2400: u8 = 0x80;
pub const REG_0X05_DPIHW_4800: u8 = 0xc0;
pub const REG_0X05_MTLLAMP: u8 = 0x30;
pub const REG_0X05_GMMENB: u8 = 0x08;
pub const REG_0X05_MTLBASE: u8 = 0x03;

pub const REG_0X06: u16 = 0x06;
pub const REG_0X06_SCANMOD: u8 = 0xe0;
pub const REG_0X06_PWRBIT: u8 = 0x10;
pub const REG_0X06_GAIN4: u8 = 0x08;
pub const REG_0X06_OPTEST: u8 = 0x07;

pub const REG_0X08: u16 = 0x08;
pub const REG_0X09: u16 = 0x09;
pub const REG_0X0A: u16 = 0x0a;

pub const REG_0X0B: u16 = 0x0b;
pub const REG_0X0B_DRAMSEL: u8 = 0x07;
pub const REG_0X0B_ENBDRAM: u8 = 0x08;

pub const REG_0X0D: u16 = 0x0d;
pub const REG_0X0D_CLRLNCNT: u8 = 0x01;
pub const REG_0X0D_CLRMCNT: u8 = 0x04;

pub const REG_0X0E: u16 = 0x0e;
pub const REG_0X0F: u16 = 0x0f;

pub const REG_EXPR: u16 = 0x10;
pub const REG_EXPG: u16 = 0x12;
pub const REG_EXPB: u16 = 0x14;

pub const REG_0X16: u16 = 0x16;
pub const REG_0X17: u16 = 0x17;
pub const REG_0X18: u16 = 0x18;

pub const REG_0X19: u16 = 0x19;
pub const REG_0X19_LAMP_ON: u8 = 0x50;
pub const REG_0X19_LAMP_OFF: u8 = 0xff;

pub const REG_0X1A: u16 = 0x1a;
pub const REG_0X1B: u16 = 0x1b;

pub const REG_0X1C: u16 = 0x1c;
pub const REG_0X1C_TGTIME: u8 = 0x07;

pub const REG_0X1D: u16 = 0x1d;

pub const REG_0X1E: u16 = 0x1e;
pub const REG_0X1E_WDTIME: u8 = 0xf0;
pub const REG_0X1E_LINESEL: u8 = 0x0f;

pub const REG_0X1F: u16 = 0x1f;
pub const REG_0X20: u16 = 0x20;

pub const REG_STEPNO: u16 = 0x21;
pub const REG_FWDSTEP: u16 = 0x22;
pub const REG_BWDSTEP: u16 = 0x23;
pub const REG_FASTNO: u16 = 0x24;
pub const REG_LINCNT: u16 = 0x25;

pub const REG_0X2A: u16 = 0x2a;
pub const REG_0X2B: u16 = 0x2b;

pub const REG_DPISET: u16 = 0x2c;
pub const REG_0X2E: u16 = 0x2e;
pub const REG_0X2F: u16 = 0x2f;

pub const REG_STRPIXEL: u16 = 0x30;
pub const REG_ENDPIXEL: u16 = 0x32;
pub const REG_DUMMY: u16 = 0x34;
pub const REG_MAXWD: u16 = 0x35;
pub const REG_LPERIOD: u16 = 0x38;

pub const REG_0X3A: u16 = 0x3a;
pub const REG_0X3B: u16 = 0x3b;

pub const REG_FEEDL: u16 = 0x3d;

pub const REG_0X40: u16 = 0x40;
pub const REG_0X40_DOCSNR: u8 = 0x80;
pub const REG_0X40_ADFSNR: u8 = 0x40;
pub const REG_0X40_DATAENB: u8 = 0x01;

pub const REG_0X41: u16 = 0x41;
pub const REG_0X41_PWRBIT: u8 = 0x80;
pub const REG_0X41_BUFEMPTY: u8 = 0x40;
pub const REG_0X41_FEEDFSH: u8 = 0x20;
pub const REG_0X41_SCANFSH: u8 = 0x10;
pub const REG_0X41_HOMESNR: u8 = 0x08;
pub const REG_0X41_LAMPSTS: u8 = 0x04;
pub const REG_0X41_FEBUSY: u8 = 0x02;
pub const REG_0X41_MOTORENB: u8 = 0x01;

pub const REG_0X51: u16 = 0x51;
pub const REG_0X52: u16 = 0x52;
pub const REG_0X53: u16 = 0x53;
pub const REG_0X54: u16 = 0x54;
pub const REG_0X55: u16 = 0x55;
pub const REG_0X56: u16 = 0x56;
pub const REG_0X57: u16 = 0x57;
pub const REG_0X58: u16 = 0x58;
pub const REG_0X59: u16 = 0x59;
pub const REG_0X5A: u16 = 0x5a;
pub const REG_0X5B: u16 = 0x5b;
pub const REG_0X5C: u16 = 0x5c;
pub const REG_0X5D: u16 = 0x5d;
pub const REG_0X5E: u16 = 0x5e;

pub const REG_FMOVDEC: u16 = 0x5f;
pub const REG_Z1MOD: u16 = 0x60;
pub const REG_Z2MOD: u16 = 0x63;

pub const REG_0X67: u16 = 0x67;
pub const REG_0X67_STEPSEL: u8 = 0xc0;
pub const REG_0X68: u16 = 0x68;
pub const REG_0X68_FSTPSEL: u8 = 0xc0;

pub const REG_FSHDEC: u16 = 0x69;
pub const REG_FMOVNO: u16 = 0x6a;

pub const REG_0X6B: u16 = 0x6b;
pub const REG_0X6C: u16 = 0x6c;
pub const REG_0X6D: u16 = 0x6d;
pub const REG_0X6E: u16 = 0x6e;
pub const REG_0X6F: u16 = 0x6f;

pub const REG_0X70: u16 = 0x70;
pub const REG_0X71: u16 = 0x71;
pub const REG_0X72: u16 = 0x72;
pub const REG_0X73: u16 = 0x73;
pub const REG_0X74: u16 = 0x74;
pub const REG_0X75: u16 = 0x75;
pub const REG_0X76: u16 = 0x76;
pub const REG_0X77: u16 = 0x77;
pub const REG_0X78: u16 = 0x78;
pub const REG_0X79: u16 = 0x79;
pub const REG_0X7A: u16 = 0x7a;
pub const REG_0X7B: u16 = 0x7b;
pub const REG_0X7C: u16 = 0x7c;
pub const REG_0X7D: u16 = 0x7d;
pub const REG_0X7E: u16 = 0x7e;
pub const REG_0X7F: u16 = 0x7f;
pub const REG_0X80: u16 = 0x80;
pub const REG_0X87: u16 = 0x87;
pub const REG_0X87_LEDADD: u8 = 0x04;

/// Bulk endpoint address of the scan data FIFO.
pub const BULK_READ_ADDRESS: u8 = 0x45;

/// Bulk opcode of the shading and slope RAM.
pub const WRITE_BUFFER_OPCODE: u8 = 0x3c;

pub const WRITE_GAMMA_OPCODE: u8 = 0x28;

/// RAM address of the first slope table, tables are 0x8000 bytes apart.
pub const SLOPE_TABLE_ADDRESS: u32 = 0x40000;
pub const SLOPE_TABLE_STRIDE: u32 = 0x8000;
pub const SLOPE_TABLE_COUNT: usize = 5;
