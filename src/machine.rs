use crate::cpu;
use crate::error::Error;
use crate::instruction::Instruction;
use crate::io::Io;
use crate::memory::Memory;
use crate::registers::Registers;

/// The whole of the VM's state: memory, registers, whether it's still
/// running, and the host capability it talks to the world through. Owned
/// as a single value and threaded through the run loop rather than kept in
/// globals.
pub struct Machine<IO: Io> {
    pub memory: Memory,
    pub registers: Registers,
    pub running: bool,
    pub io: IO,
}

impl<IO: Io> Machine<IO> {
    pub fn new(io: IO) -> Machine<IO> {
        Machine { memory: Memory::new(), registers: Registers::new(), running: true, io }
    }

    /// Fetch, increment PC, decode, execute. One iteration of the run loop.
    pub fn step(&mut self) -> Result<(), Error> {
        let pc = self.registers.pc;
        let raw = self.memory.read(pc, &mut self.io);
        self.registers.pc = self.registers.pc.wrapping_add(1);

        let instruction = Instruction::decode(raw);
        cpu::execute(self, instruction).map_err(|_| Error::IllegalInstruction { opcode: raw, pc })
    }

    /// Runs until `running` goes false (HALT) or an instruction is illegal.
    /// `should_stop` is polled between instructions so a host-delivered
    /// signal can end the loop without the core modelling cancellation
    /// itself.
    pub fn run(&mut self, mut should_stop: impl FnMut() -> bool) -> Result<(), Error> {
        while self.running && !should_stop() {
            self.step()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RecordingIo;

    fn machine_with(words: &[(u16, u16)]) -> Machine<RecordingIo> {
        let mut machine = Machine::new(RecordingIo::new(&[]));
        for &(addr, word) in words {
            machine.memory.write(addr, word);
        }
        machine
    }

    #[test]
    fn smallest_valid_program_halts() {
        let mut machine = machine_with(&[(0x3000, 0xF025)]);

        machine.run(|| false).unwrap();

        assert!(!machine.running);
        assert!(machine.io.output_string().contains("HALT"));
    }

    #[test]
    fn add_and_halt_leaves_r0_at_7_with_positive_condition() {
        let mut machine = machine_with(&[
            (0x3000, 0b0001_000_000_1_00000), // ADD R0, R0, #0
            (0x3001, 0b0001_000_000_1_00111), // ADD R0, R0, #7
            (0x3002, 0xF025),
        ]);

        machine.run(|| false).unwrap();

        assert_eq!(machine.registers.read(crate::registers::Register::R0), 7);
        assert_eq!(machine.registers.condition, crate::registers::Condition::P);
    }

    #[test]
    fn lea_sets_condition() {
        let mut machine = machine_with(&[
            (0x3000, 0b1110_000_000000001), // LEA R0, #1
            (0x3001, 0xF025),
        ]);

        machine.run(|| false).unwrap();

        assert_eq!(machine.registers.read(crate::registers::Register::R0), 0x3002);
        assert_eq!(machine.registers.condition, crate::registers::Condition::P);
    }

    #[test]
    fn illegal_opcode_aborts_without_halting() {
        let mut machine = machine_with(&[(0x3000, 0x8000)]); // RTI

        let result = machine.run(|| false);

        assert!(matches!(result, Err(Error::IllegalInstruction { .. })));
        assert!(!machine.io.output_string().contains("HALT"));
    }

    #[test]
    fn should_stop_ends_the_loop_without_halting() {
        // an infinite loop: BR back to itself
        let mut machine = machine_with(&[(0x3000, 0b0000_111_111111111)]);

        let mut calls = 0;
        machine
            .run(|| {
                calls += 1;
                calls > 3
            })
            .unwrap();

        assert!(machine.running);
    }
}
