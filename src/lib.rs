// (c) Meta Platforms, Inc. and affiliates.
//
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

pub mod cli;
pub mod farm;
pub mod output;
pub mod pytest;
pub mod spec;
pub mod template;
pub mod upload;
