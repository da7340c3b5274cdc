use crate::instruction::Instruction;
use crate::io::Io;
use crate::machine::Machine;
use crate::registers::{Condition, Register};
use crate::trap_vector::TrapVector;

/// Executes one decoded instruction against `machine`. Returns `Err(())` for
/// the two illegal opcodes (`RTI`/`UNUSED` and the reserved opcode); the
/// caller (`Machine::step`) is responsible for turning that into a typed,
/// addressed `Error`.
pub fn execute<IO: Io>(machine: &mut Machine<IO>, instruction: Instruction) -> Result<(), ()> {
    match instruction {
        // BR - Conditional Branch
        //
        // Assembler Formats
        //
        //      BRn     LABEL   BRzp    LABEL
        //      BRz     LABEL   BRnp    LABEL
        //      BRp     LABEL   BRnz    LABEL
        //      BR[1]   LABEL   BRnzp   LABEL
        //
        // Description
        //
        // The condition codes specified by n/z/p are tested against COND. If
        // any of the tested flags is set, the program branches to the
        // location specified by adding the sign-extended pc_offset9 field to
        // the incremented PC.
        //
        // [1]: BR with no flags named is interpreted as BRnzp, i.e. it always
        // branches.
        Instruction::Br { n, z, p, pc_offset } => {
            let condition = machine.registers.condition;
            let taken = (n && condition == Condition::N)
                || (z && condition == Condition::Z)
                || (p && condition == Condition::P);

            if taken {
                machine.registers.pc = machine.registers.pc.wrapping_add(pc_offset);
            }
        }

        // ADD - Addition
        //
        // Assembler Formats
        //
        //      ADD DR, SR1, SR2
        //      ADD DR, SR1, imm5
        //
        // Description
        //
        // The second source operand is obtained either from SR2 or, in the
        // immediate form, by sign-extending imm5 to 16 bits. It is added to
        // the contents of SR1 and the result stored in DR. The condition
        // codes are set based on whether the result is negative, zero, or
        // positive.
        Instruction::Add { dr, sr1, sr2 } => {
            let value = machine.registers.read(sr1).wrapping_add(machine.registers.read(sr2));
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }
        Instruction::AddImm { dr, sr1, imm5 } => {
            let value = machine.registers.read(sr1).wrapping_add(imm5);
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }

        // LD - Load
        //
        // Assembler Format
        //
        //      LD DR, LABEL
        //
        // Description
        //
        // An address is computed by sign-extending pc_offset9 to 16 bits and
        // adding this value to the incremented PC. The contents of memory at
        // this address are loaded into DR. The condition codes are set based
        // on whether the value loaded is negative, zero, or positive.
        Instruction::Ld { dr, pc_offset } => {
            let address = machine.registers.pc.wrapping_add(pc_offset);
            let value = machine.memory.read(address, &mut machine.io);
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }

        // ST - Store
        //
        // Assembler Format
        //
        //      ST SR, LABEL
        //
        // Description
        //
        // The contents of SR are stored in the memory location whose address
        // is computed by sign-extending pc_offset9 to 16 bits and adding this
        // value to the incremented PC.
        Instruction::St { sr, pc_offset } => {
            let address = machine.registers.pc.wrapping_add(pc_offset);
            machine.memory.write(address, machine.registers.read(sr));
        }

        // JSR / JSRR - Jump to Subroutine
        //
        // Assembler Formats
        //
        //      JSR LABEL
        //      JSRR BaseR
        //
        // Description
        //
        // First the incremented PC is saved in R7; this is the linkage back
        // to the calling routine. Then PC jumps to the subroutine's first
        // instruction: for JSR, the incremented PC plus a sign-extended
        // 11-bit offset; for JSRR, the contents of the base register.
        Instruction::Jsr { pc_offset } => {
            let return_address = machine.registers.pc;
            machine.registers.pc = machine.registers.pc.wrapping_add(pc_offset);
            machine.registers.write(Register::R7, return_address);
        }
        Instruction::Jsrr { base_r } => {
            let return_address = machine.registers.pc;
            machine.registers.pc = machine.registers.read(base_r);
            machine.registers.write(Register::R7, return_address);
        }

        // AND - Bit-wise Logical AND
        //
        // Assembler Formats
        //
        //      AND DR, SR1, SR2
        //      AND DR, SR1, imm5
        //
        // Description
        //
        // The second source operand (SR2, or the sign-extended imm5 in the
        // immediate form) and the contents of SR1 are bit-wise ANDed and the
        // result stored in DR. The condition codes are set based on whether
        // the result, taken as a two's complement integer, is negative,
        // zero, or positive.
        Instruction::And { dr, sr1, sr2 } => {
            let value = machine.registers.read(sr1) & machine.registers.read(sr2);
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }
        Instruction::AndImm { dr, sr1, imm5 } => {
            let value = machine.registers.read(sr1) & imm5;
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }

        // LDR - Load Base+offset
        //
        // Assembler Format
        //
        //      LDR DR, BaseR, offset6
        //
        // Description
        //
        // An address is computed by sign-extending offset6 to 16 bits and
        // adding this value to the contents of BaseR. The contents of memory
        // at this address are loaded into DR. The condition codes are set
        // based on whether the value loaded is negative, zero, or positive.
        Instruction::Ldr { dr, base_r, offset } => {
            let address = machine.registers.read(base_r).wrapping_add(offset);
            let value = machine.memory.read(address, &mut machine.io);
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }

        // STR - Store Base+offset
        //
        // Assembler Format
        //
        //      STR SR, BaseR, offset6
        //
        // Description
        //
        // The contents of SR are stored in the memory location whose address
        // is computed by sign-extending offset6 to 16 bits and adding this
        // value to the contents of BaseR.
        Instruction::Str { sr, base_r, offset } => {
            let address = machine.registers.read(base_r).wrapping_add(offset);
            machine.memory.write(address, machine.registers.read(sr));
        }

        // RTI - Return from Interrupt. Illegal in user mode; this emulator
        // has no supervisor mode to return to.
        Instruction::Unused => return Err(()),

        // NOT - Bit-Wise Complement
        //
        // Assembler Format
        //
        //      NOT DR, SR
        //
        // Description
        //
        // The bit-wise complement of the contents of SR is stored in DR. The
        // condition codes are set based on whether the result, taken as a
        // two's complement integer, is negative, zero, or positive.
        Instruction::Not { dr, sr } => {
            let value = !machine.registers.read(sr);
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }

        // LDI - Load Indirect
        //
        // Assembler Format
        //
        //      LDI DR, LABEL
        //
        // Description
        //
        // An address is computed by sign-extending pc_offset9 to 16 bits and
        // adding this value to the incremented PC. What is stored in memory
        // at this address is itself the address of the data to load into DR.
        // The condition codes are set based on whether the value loaded is
        // negative, zero, or positive.
        Instruction::Ldi { dr, pc_offset } => {
            let pointer_address = machine.registers.pc.wrapping_add(pc_offset);
            let address = machine.memory.read(pointer_address, &mut machine.io);
            let value = machine.memory.read(address, &mut machine.io);
            machine.registers.write(dr, value);
            machine.registers.set_condition_from(dr);
        }

        // STI - Store Indirect
        //
        // Assembler Format
        //
        //      STI SR, LABEL
        //
        // Description
        //
        // An address is computed by sign-extending pc_offset9 to 16 bits and
        // adding this value to the incremented PC. What is in memory at this
        // address is itself the address of the location to which the
        // contents of SR are stored.
        Instruction::Sti { sr, pc_offset } => {
            let pointer_address = machine.registers.pc.wrapping_add(pc_offset);
            let address = machine.memory.read(pointer_address, &mut machine.io);
            machine.memory.write(address, machine.registers.read(sr));
        }

        // JMP - Jump
        // RET - Return from Subroutine
        //
        // Assembler Formats
        //
        //      JMP BaseR
        //      RET
        //
        // Description
        //
        // The program unconditionally jumps to the address contained in
        // BaseR. RET has no distinct encoding; it is JMP R7, using the
        // linkage register JSR/JSRR/TRAP left behind.
        Instruction::Jmp { base_r } => {
            machine.registers.pc = machine.registers.read(base_r);
        }

        // The reserved opcode. Illegal; no operation is defined for it.
        Instruction::Reserved => return Err(()),

        // LEA - Load Effective Address
        //
        // Assembler Format
        //
        //      LEA DR, LABEL
        //
        // Description
        //
        // An address is computed by sign-extending pc_offset9 to 16 bits and
        // adding this value to the incremented PC. This address itself (not
        // the memory at that address) is loaded into DR. The condition codes
        // are set based on whether the value loaded is negative, zero, or
        // positive; this is the revision-1 LC-3 behavior this emulator
        // targets (revision-2 dropped it).
        Instruction::Lea { dr, pc_offset } => {
            let address = machine.registers.pc.wrapping_add(pc_offset);
            machine.registers.write(dr, address);
            machine.registers.set_condition_from(dr);
        }

        // TRAP - System Call
        //
        // Assembler Format
        //
        //      TRAP trapvector8
        //
        // Description
        //
        // First R7 is loaded with the incremented PC, enabling a return via
        // JMP R7 once the service routine completes. Then the trap vector
        // (bits [7:0]) selects one of the fixed service routines below.
        Instruction::Trap { vector } => {
            machine.registers.write(Register::R7, machine.registers.pc);
            execute_trap(machine, vector);
        }
    }

    Ok(())
}

fn execute_trap<IO: Io>(machine: &mut Machine<IO>, vector: TrapVector) {
    match vector {
        // Read a single character from the keyboard, blocking until one is
        // available. The character is not echoed. Its ASCII code is copied
        // into R0 with the high eight bits cleared.
        TrapVector::GetChar => {
            let byte = machine.io.read_byte().unwrap_or(0);
            machine.registers.write(Register::R0, u16::from(byte));
            machine.registers.set_condition_from(Register::R0);
        }

        // Write the character in R0[7:0] to the console display.
        TrapVector::Out => {
            let byte = machine.registers.read(Register::R0) as u8;
            let _ = machine.io.write_bytes(&[byte]);
            let _ = machine.io.flush();
        }

        // Write a string of ASCII characters to the console display. The
        // characters are contained in consecutive memory locations, one
        // character per word, starting at the address in R0. Writing
        // terminates at the first zero word.
        TrapVector::Puts => {
            let mut address = machine.registers.read(Register::R0);
            loop {
                let word = machine.memory.read(address, &mut machine.io);
                if word == 0 {
                    break;
                }
                let _ = machine.io.write_bytes(&[word as u8]);
                address = address.wrapping_add(1);
            }
            let _ = machine.io.flush();
        }

        // Print a prompt on the screen and read a single character from the
        // keyboard. The character is echoed to the console and its ASCII
        // code copied into R0, high eight bits cleared.
        TrapVector::In => {
            let _ = machine.io.write_bytes(b"Enter a character: ");
            let _ = machine.io.flush();

            let byte = machine.io.read_byte().unwrap_or(0);
            let _ = machine.io.write_bytes(&[byte]);
            let _ = machine.io.flush();

            machine.registers.write(Register::R0, u16::from(byte));
            machine.registers.set_condition_from(Register::R0);
        }

        // Write a string of ASCII characters to the console, two characters
        // per memory location starting at the address in R0: bits [7:0]
        // first, then bits [15:8]. A high byte of zero is not printed (it
        // only occurs as the padding byte of an odd-length string's final
        // word). Writing terminates at the first zero word.
        TrapVector::PutsPacked => {
            let mut address = machine.registers.read(Register::R0);
            loop {
                let word = machine.memory.read(address, &mut machine.io);
                if word == 0 {
                    break;
                }

                let low = (word & 0xFF) as u8;
                let _ = machine.io.write_bytes(&[low]);

                let high = (word >> 8) as u8;
                if high != 0 {
                    let _ = machine.io.write_bytes(&[high]);
                }

                address = address.wrapping_add(1);
            }
            let _ = machine.io.flush();
        }

        // Halt execution and print a message on the console.
        TrapVector::Halt => {
            let _ = machine.io.write_bytes(b"HALT\n");
            let _ = machine.io.flush();
            machine.running = false;
        }

        // Unrecognized vectors have no effect at all.
        TrapVector::Unknown(_) => {}
    }
}
