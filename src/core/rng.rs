//! Random Number Generator
//!
//! A PCG32 generator. Each batch of sun rays selects its own sequence
//! with [set_sequence](struct.Rng.html#method.set_sequence), so the
//! photons of a batch never depend on which thread traced it.

use hexf::*;

// solar
use crate::core::solar::Float;

pub const FLOAT_ONE_MINUS_EPSILON: Float = hexf64!("0x1.fffffffffffffp-1");
pub const PCG32_DEFAULT_STATE: u64 = 0x853c_49e6_748f_ea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e_39cb_94b9_5bdb;
pub const PCG32_MULT: u64 = 0x5851_f42d_4c95_7f2d;

/// Random number generator
#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Default for Rng {
    fn default() -> Self {
        Rng::new()
    }
}

impl Rng {
    pub fn new() -> Self {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
    pub fn with_sequence(initseq: u64) -> Self {
        let mut rng = Rng::new();
        rng.set_sequence(initseq);
        rng
    }
    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0_u64;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }
    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate: u64 = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted: u32 = (oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27) as u32;
        let rot: u32 = oldstate.wrapping_shr(59) as u32;
        xorshifted.wrapping_shr(rot)
            | xorshifted.wrapping_shl((!rot).wrapping_add(1_u32) & 31)
    }
    /// Skips `delta` values of the sequence in O(log delta) steps.
    pub fn advance(&mut self, delta: u64) {
        let mut cur_mult: u64 = PCG32_MULT;
        let mut cur_plus: u64 = self.inc;
        let mut acc_mult: u64 = 1_u64;
        let mut acc_plus: u64 = 0_u64;
        let mut delta: u64 = delta;
        while delta > 0 {
            if delta & 1 == 1 {
                acc_mult = acc_mult.wrapping_mul(cur_mult);
                acc_plus = acc_plus.wrapping_mul(cur_mult).wrapping_add(cur_plus);
            }
            cur_plus = cur_mult.wrapping_add(1).wrapping_mul(cur_plus);
            cur_mult = cur_mult.wrapping_mul(cur_mult);
            delta /= 2;
        }
        self.state = acc_mult.wrapping_mul(self.state).wrapping_add(acc_plus);
    }
    /// Uniform value in [0, 1).
    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * hexf64!("0x1.0p-32")).min(FLOAT_ONE_MINUS_EPSILON)
    }
}
