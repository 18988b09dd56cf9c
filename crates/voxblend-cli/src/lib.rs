//! voxblend CLI library.
//!
//! This crate provides the command implementations behind the `voxblend`
//! binary: conversion, audio analysis, and environment checks.

pub mod commands;
