use super::{c_to_string, size_t_to_usize};
use crate::{
    decoder::{
        factory::DecoderImplementation, hard_decisions, DecoderOptions, LdpcDecoder, TannerGraph,
    },
    sparse::SparseMatrix,
};
use libc::size_t;
use std::{
    convert::TryFrom,
    error::Error,
    ffi::{c_char, c_void},
    sync::Arc,
};

#[derive(Debug)]
struct Decoder {
    decoder: Box<dyn LdpcDecoder>,
}

impl Decoder {
    fn new(alist: &str, implementation: &str, max_iterations: u32) -> Result<Decoder, Box<dyn Error>> {
        let h = SparseMatrix::from_alist(&std::fs::read_to_string(alist)?)?;
        let graph = Arc::new(TannerGraph::from_matrix(&h)?);
        let implementation: DecoderImplementation = implementation.parse()?;
        let options = DecoderOptions {
            max_iterations: usize::try_from(max_iterations)?,
            ..Default::default()
        };
        Ok(Decoder {
            decoder: implementation.build_decoder(graph, &options)?,
        })
    }

    fn decode_f32(&mut self, output: &mut [u8], llrs: &[f32]) -> i32 {
        let result = self.decoder.decode(llrs);
        let decisions = hard_decisions(&result.posterior_llr);
        output.copy_from_slice(&decisions[..output.len()]);
        if result.converged {
            i32::try_from(result.iterations).unwrap()
        } else {
            -1
        }
    }
}

#[no_mangle]
unsafe extern "C" fn fecsim_decoder_ctor(
    alist: *const c_char,
    implementation: *const c_char,
    max_iterations: u32,
) -> *mut c_void {
    let alist = c_to_string(alist);
    let implementation = c_to_string(implementation);
    if let Ok(decoder) = Decoder::new(&alist, &implementation, max_iterations) {
        Box::into_raw(Box::new(decoder)) as *mut c_void
    } else {
        std::ptr::null_mut()
    }
}

#[no_mangle]
unsafe extern "C" fn fecsim_decoder_dtor(decoder: *mut c_void) {
    drop(Box::from_raw(decoder as *mut Decoder));
}

#[no_mangle]
unsafe extern "C" fn fecsim_decoder_decode_f32(
    decoder: *mut c_void,
    output: *mut u8,
    output_len: size_t,
    llrs: *const f32,
    llrs_len: size_t,
) -> i32 {
    let output = std::slice::from_raw_parts_mut(output, size_t_to_usize(output_len));
    let llrs = std::slice::from_raw_parts(llrs, size_t_to_usize(llrs_len));
    let decoder = &mut *(decoder as *mut Decoder);
    decoder.decode_f32(output, llrs)
}
