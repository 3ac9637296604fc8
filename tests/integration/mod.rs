// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod block_handling_test;
pub mod comment_flow_test;
pub mod helpers;
pub mod video_flow_test;
