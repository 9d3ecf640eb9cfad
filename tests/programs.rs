use std::io;

use color_eyre::eyre::{eyre, Result};

use ls8::error::Fault;
use ls8::memory::StdMem;
use ls8::processor::{Processor, State};

/// Loads `listing`, runs it to completion and returns what it printed.
fn run(listing: &str) -> Result<(Processor, String)> {
    let mut mem: StdMem = listing
        .parse()
        .map_err(|errors| eyre!("listing did not load: {:?}", errors))?;
    let mut cpu = Processor::default();
    let mut out = Vec::new();

    cpu.execute_until_halt(&mut mem, &mut out)?;

    Ok((cpu, String::from_utf8(out)?))
}

#[test]
fn print8() -> Result<()> {
    let (cpu, out) = run(include_str!("../programs/print8.ls8"))?;

    assert_eq!(out, "8\n");
    assert_eq!(cpu.state, State::Halted);
    assert_eq!(cpu.pc, 5);

    Ok(())
}

#[test]
fn mult() -> Result<()> {
    let (_, out) = run(include_str!("../programs/mult.ls8"))?;

    assert_eq!(out, "72\n");

    Ok(())
}

#[test]
fn stack() -> Result<()> {
    let (cpu, out) = run(include_str!("../programs/stack.ls8"))?;

    assert_eq!(out, "2\n1\n");
    assert_eq!(cpu.sp, 0);

    Ok(())
}

#[test]
fn call() -> Result<()> {
    let (cpu, out) = run(include_str!("../programs/call.ls8"))?;

    assert_eq!(out, "42\n");
    assert_eq!(cpu.sp, 0);
    assert_eq!(cpu.pc, 7);

    Ok(())
}

#[test]
fn sctest() -> Result<()> {
    let (cpu, out) = run(include_str!("../programs/sctest.ls8"))?;

    assert_eq!(out, "1\n2\n");
    assert_eq!(cpu.pc, 52);

    Ok(())
}

#[test]
fn unknown_opcode_faults_without_aborting() -> Result<()> {
    let mut mem: StdMem = "10000010\n0\n1\n11111111\n"
        .parse()
        .map_err(|errors| eyre!("listing did not load: {:?}", errors))?;
    let mut cpu = Processor::default();

    let result = cpu.execute_until_halt(&mut mem, &mut io::sink());

    let fault = Fault::InvalidOpcode {
        opcode: 0xFF,
        pc: 3,
    };
    assert_eq!(result, Err(fault));
    assert_eq!(cpu.state, State::Faulted(fault));
    assert_eq!(
        fault.to_string(),
        "invalid opcode `0xFF` at `0x03`"
    );

    Ok(())
}

#[test]
fn machines_are_independent() -> Result<()> {
    let (first, _) = run(include_str!("../programs/mult.ls8"))?;
    let (second, _) = run(include_str!("../programs/print8.ls8"))?;

    assert_eq!(&first.registers.data[..2], &[72, 9]);
    assert_eq!(second.registers.data[0], 8);
    assert_eq!(second.registers.data[1], 0);

    Ok(())
}
