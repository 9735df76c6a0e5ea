// Copyright (c) 2026 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

#![no_main]

use libfuzzer_sys::fuzz_target;

use v2xlib::codec::{SignerId, Spdu};
use v2xlib::{DerCodec, SpduCodec};

fuzz_target!(|data: &[u8]| {
    let codec = DerCodec;

    if let Ok(Spdu::Signed(signed)) = codec.decode_spdu(data) {
        let _ = codec.encode_tbs_data(&signed.tbs);

        if let SignerId::Certificate(cert) = &signed.signer {
            let _ = codec.decode_certificate(cert);
        }
    }

    if let Ok(cert) = codec.decode_certificate(data) {
        let _ = cert.contents.check_validity_window();
        let _ = cert.h8();
    }
});
