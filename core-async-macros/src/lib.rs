//! Attribute macros for async entry points and tests.
//!
//! `#[core_async::test]` and `#[core_async::main]` expand to a synchronous
//! wrapper driven by `core_async::runtime` on native targets and to a plain
//! `async fn` (registered with `wasm_bindgen_test` for tests) on wasm32.
//!
//! Tests may pass `start_paused` (or `start_paused = true`, as with
//! `#[tokio::test]`) to run on a runtime whose clock starts paused:
//!
//! ```ignore
//! #[core_async::test(start_paused = true)]
//! async fn ready_timeout_fires() { /* 5s waits complete instantly */ }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, Expr, ExprLit, ItemFn, Lit, Meta, MetaNameValue};

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Test)
}

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    expand(attr, item, MacroKind::Main)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum MacroKind {
    Test,
    Main,
}

#[derive(Clone, Copy)]
enum Clock {
    Running,
    Paused,
}

fn parse_clock(attr: TokenStream, kind: MacroKind) -> Result<Clock, syn::Error> {
    if attr.is_empty() {
        return Ok(Clock::Running);
    }

    let tokens = TokenStream2::from(attr);
    let meta: Meta = syn::parse2(tokens.clone()).map_err(|_| {
        syn::Error::new_spanned(&tokens, "expected `start_paused` or `start_paused = <bool>`")
    })?;

    if !meta.path().is_ident("start_paused") {
        return Err(syn::Error::new_spanned(
            meta.path(),
            "expected `start_paused` or `start_paused = <bool>`",
        ));
    }

    let paused = match &meta {
        Meta::Path(_) => true,
        Meta::NameValue(MetaNameValue {
            value:
                Expr::Lit(ExprLit {
                    lit: Lit::Bool(flag),
                    ..
                }),
            ..
        }) => flag.value,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "`start_paused` takes a boolean literal",
            ))
        }
    };

    if !paused {
        return Ok(Clock::Running);
    }
    if kind == MacroKind::Main {
        return Err(syn::Error::new_spanned(
            meta,
            "`start_paused` is only supported on tests",
        ));
    }
    Ok(Clock::Paused)
}

fn expand(attr: TokenStream, item: TokenStream, kind: MacroKind) -> TokenStream {
    let clock = match parse_clock(attr, kind) {
        Ok(clock) => clock,
        Err(err) => return err.to_compile_error().into(),
    };

    let input = parse_macro_input!(item as ItemFn);

    if input.sig.asyncness.is_none() {
        return syn::Error::new_spanned(
            input.sig.fn_token,
            "core_async attribute macros require `async fn`",
        )
        .to_compile_error()
        .into();
    }

    let mut sync_sig = input.sig.clone();
    sync_sig.asyncness = None;
    let async_sig = input.sig;
    let attrs = input.attrs;
    let vis = input.vis;
    let block = input.block;

    let runner = match clock {
        Clock::Running => quote!(core_async::runtime::block_on),
        Clock::Paused => quote!(core_async::runtime::block_on_paused),
    };

    let (native_marker, wasm_marker) = match kind {
        MacroKind::Test => (
            quote!(#[test]),
            quote!(#[cfg_attr(
                target_arch = "wasm32",
                core_async::test_support::wasm_bindgen_test
            )]),
        ),
        MacroKind::Main => (TokenStream2::new(), TokenStream2::new()),
    };

    quote! {
        #[cfg(not(target_arch = "wasm32"))]
        #(#attrs)*
        #native_marker
        #vis #sync_sig {
            #runner(async move #block)
        }

        #[cfg(target_arch = "wasm32")]
        #(#attrs)*
        #wasm_marker
        #vis #async_sig #block
    }
    .into()
}
