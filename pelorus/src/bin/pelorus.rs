// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

use pelorus::{server, Error};

fn main() -> Result<(), Error> {
    server::run_server()
}
