use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat};

/// Times a navigation system when the `perf_stats` feature is enabled.
///
/// The body is wrapped in a drop guard that reports elapsed time through
/// `bevy::log::info!` once it exceeds the threshold (milliseconds, default 1).
/// When the system takes a `tick: Res<NavTick>` parameter the timing is also
/// reported on every 100th tick regardless of duration.
///
/// ```ignore
/// #[profile(2)]
/// pub fn steer_agents(agents: Query<&NavAgent>, tick: Res<NavTick>) {
///     // ...
/// }
/// ```
///
/// Without `perf_stats` the guard is compiled out entirely.
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        match syn::parse::<LitInt>(attr) {
            Ok(lit) => lit.base10_parse().unwrap_or(1),
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let name = sig.ident.to_string();

    let tick_expr = if takes_nav_tick(&input) {
        quote! { Some(tick.0) }
    } else {
        quote! { None }
    };
    let guard = timing_guard(&name, threshold_ms, tick_expr);

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _nav_profile_guard = { #guard };

            #block
        }
    };

    output.into()
}

fn takes_nav_tick(input: &ItemFn) -> bool {
    input.sig.inputs.iter().any(|arg| match arg {
        FnArg::Typed(pat_type) => match &*pat_type.pat {
            Pat::Ident(ident) if ident.ident == "tick" => {
                let ty = &pat_type.ty;
                quote!(#ty).to_string().contains("NavTick")
            }
            _ => false,
        },
        FnArg::Receiver(_) => false,
    })
}

fn timing_guard(name: &str, threshold_ms: u128, tick_expr: TokenStream2) -> TokenStream2 {
    quote! {
        struct NavProfileGuard {
            name: &'static str,
            start: std::time::Instant,
            tick: Option<u64>,
        }
        impl Drop for NavProfileGuard {
            fn drop(&mut self) {
                let elapsed = self.start.elapsed();
                let periodic = self.tick.map_or(false, |t| t % 100 == 0);
                if elapsed.as_millis() > #threshold_ms || periodic {
                    bevy::log::info!("[PERF] {}: {:?}", self.name, elapsed);
                }
            }
        }
        NavProfileGuard {
            name: #name,
            start: std::time::Instant::now(),
            tick: #tick_expr,
        }
    }
}
