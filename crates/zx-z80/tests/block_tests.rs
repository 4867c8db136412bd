//! Block transfer, search and I/O instructions.

use zx_core::SimpleBus;
use zx_z80::Z80;
use zx_z80::ops::{CF, HF, NF, PF, SF, XF, YF, ZF};

fn cpu_at(bus: &mut SimpleBus, origin: u16, program: &[u8]) -> Z80 {
    bus.load(origin, program);
    let mut cpu = Z80::new();
    cpu.registers_mut().pc = origin;
    cpu
}

fn set_block(cpu: &mut Z80, hl: u16, de: u16, bc: u16) {
    let regs = cpu.registers_mut();
    regs.set_hl(hl);
    regs.set_de(de);
    regs.set_bc(bc);
}

#[test]
fn test_ldi_single_element() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xA0]); // LDI
    set_block(&mut cpu, 0x8000, 0x9000, 3);
    cpu.registers_mut().f = SF | ZF | CF | HF | NF;
    bus.load(0x8000, &[0xAA]);

    cpu.step(&mut bus).expect("LDI");

    let regs = cpu.registers();
    assert_eq!(bus.peek(0x9000), 0xAA);
    assert_eq!(regs.hl(), 0x8001);
    assert_eq!(regs.de(), 0x9001);
    assert_eq!(regs.bc(), 2);
    // n = 0xAA + A(0) = 0b1010_1010: bit 3 -> F3, bit 1 -> F5
    assert_eq!(regs.f, SF | ZF | CF | PF | XF | YF);
    assert_eq!(cpu.pc(), 0x0002);
}

#[test]
fn test_ldir_moves_one_element_per_step() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xB0, 0x76]); // LDIR; HALT
    set_block(&mut cpu, 0x8000, 0x9000, 3);
    bus.load(0x8000, &[0xAA, 0xBB, 0xCC]);

    cpu.step(&mut bus).expect("LDIR");
    assert_eq!(cpu.pc(), 0x0000, "repeat rewinds onto the ED prefix");
    assert_eq!(cpu.registers().bc(), 2);
    assert_ne!(cpu.registers().f & PF, 0);

    cpu.step(&mut bus).expect("LDIR");
    cpu.step(&mut bus).expect("LDIR");

    let regs = cpu.registers();
    assert_eq!(cpu.pc(), 0x0002);
    assert_eq!(regs.bc(), 0);
    assert_eq!(regs.hl(), 0x8003);
    assert_eq!(regs.de(), 0x9003);
    assert_eq!(regs.f & (PF | HF | NF), 0);
    assert_eq!(
        [bus.peek(0x9000), bus.peek(0x9001), bus.peek(0x9002)],
        [0xAA, 0xBB, 0xCC]
    );
}

#[test]
fn test_lddr_copies_downwards() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xB8, 0x76]); // LDDR; HALT
    set_block(&mut cpu, 0x8002, 0x9002, 3);
    bus.load(0x8000, &[0x01, 0x02, 0x03]);

    while !cpu.is_halted() {
        cpu.step(&mut bus).expect("LDDR");
    }

    assert_eq!(
        [bus.peek(0x9000), bus.peek(0x9001), bus.peek(0x9002)],
        [0x01, 0x02, 0x03]
    );
    assert_eq!(cpu.registers().hl(), 0x7FFF);
    assert_eq!(cpu.registers().de(), 0x8FFF);
}

#[test]
fn test_cpir_stops_on_match() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xB1, 0x76]); // CPIR; HALT
    set_block(&mut cpu, 0x8000, 0x0000, 4);
    {
        let regs = cpu.registers_mut();
        regs.a = 0x03;
        regs.f = CF;
    }
    bus.load(0x8000, &[0x01, 0x02, 0x03, 0x04]);

    let mut steps = 0;
    while !cpu.is_halted() {
        cpu.step(&mut bus).expect("CPIR");
        steps += 1;
    }

    let regs = cpu.registers();
    assert_eq!(steps, 4); // three compares and the HALT
    assert_eq!(regs.hl(), 0x8003);
    assert_eq!(regs.bc(), 1);
    assert_eq!(regs.f & (ZF | PF | NF | CF), ZF | PF | NF | CF);
}

#[test]
fn test_cpir_runs_out() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xB1, 0x76]);
    set_block(&mut cpu, 0x8000, 0x0000, 2);
    cpu.registers_mut().a = 0xFF;
    bus.load(0x8000, &[0x01, 0x02]);

    while !cpu.is_halted() {
        cpu.step(&mut bus).expect("CPIR");
    }

    let regs = cpu.registers();
    assert_eq!(regs.bc(), 0);
    assert_eq!(regs.f & (ZF | PF), 0);
}

#[test]
fn test_cpd_flags() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xA9]); // CPD
    set_block(&mut cpu, 0x8000, 0x0000, 1);
    cpu.registers_mut().a = 0x10;
    bus.load(0x8000, &[0x01]);

    cpu.step(&mut bus).expect("CPD");

    // 0x10 - 0x01 = 0x0F with half borrow; n = 0x0E
    let regs = cpu.registers();
    assert_eq!(regs.hl(), 0x7FFF);
    assert_eq!(regs.f, NF | HF | XF | YF);
}

#[test]
fn test_inir_reads_ports_into_memory() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xB2, 0x76]); // INIR; HALT
    set_block(&mut cpu, 0x8000, 0x0000, 0x02FE);
    bus.set_port(0x02FE, 0x11);
    bus.set_port(0x01FE, 0x22);

    while !cpu.is_halted() {
        cpu.step(&mut bus).expect("INIR");
    }

    let regs = cpu.registers();
    assert_eq!(bus.peek(0x8000), 0x11);
    assert_eq!(bus.peek(0x8001), 0x22);
    assert_eq!(regs.b, 0);
    assert_eq!(regs.hl(), 0x8002);
    assert_ne!(regs.f & ZF, 0);
}

#[test]
fn test_ini_flags() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xA2]); // INI
    set_block(&mut cpu, 0x8000, 0x0000, 0x01FF);
    bus.set_port(0x01FF, 0x80);

    cpu.step(&mut bus).expect("INI");

    // k = 0x80 + ((C + 1) & 0xFF) = 0x80: no carry, B = 0
    // PV = parity((0x80 & 7) ^ 0) = parity(0)
    let regs = cpu.registers();
    assert_eq!(regs.f, ZF | NF | PF);
}

#[test]
fn test_otir_decrements_b_before_output() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xB3, 0x76]); // OTIR; HALT
    set_block(&mut cpu, 0x8000, 0x0000, 0x0210);
    bus.load(0x8000, &[0xA1, 0xB2]);

    while !cpu.is_halted() {
        cpu.step(&mut bus).expect("OTIR");
    }

    assert_eq!(bus.port_writes(), &[(0x0110, 0xA1), (0x0010, 0xB2)]);
    assert_eq!(cpu.registers().hl(), 0x8002);
}

#[test]
fn test_outi_half_carry_from_l() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0000, &[0xED, 0xA3]); // OUTI
    set_block(&mut cpu, 0x80FF, 0x0000, 0x0510);
    bus.load(0x80FF, &[0x10]);

    cpu.step(&mut bus).expect("OUTI");

    // L is 0x00 after the increment, so k = 0x10: no carry.
    let regs = cpu.registers();
    assert_eq!(regs.b, 0x04);
    assert_eq!(regs.hl(), 0x8100);
    assert_eq!(regs.f & (HF | CF), 0);
}

#[test]
fn test_interrupt_between_ldir_elements() {
    let mut bus = SimpleBus::new();
    let mut cpu = cpu_at(&mut bus, 0x0100, &[0xED, 0xB0]); // LDIR
    set_block(&mut cpu, 0x8000, 0x9000, 3);
    {
        let regs = cpu.registers_mut();
        regs.sp = 0xF000;
        regs.iff1 = true;
        regs.iff2 = true;
        regs.im = 1;
    }

    cpu.step(&mut bus).expect("LDIR");
    cpu.request_interrupt();
    cpu.step(&mut bus).expect("interrupt, then NOP at 0x38");

    // The return address is the LDIR itself, which resumes afterwards.
    assert_eq!(bus.peek(0xEFFE), 0x00);
    assert_eq!(bus.peek(0xEFFF), 0x01);
    assert_eq!(cpu.pc(), 0x0039);
    assert_eq!(cpu.registers().bc(), 2);
}
