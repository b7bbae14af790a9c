use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// `#[profile(ms)]`: log how long a pipeline stage took, `perf_stats` builds only.
///
/// Logs when the stage runs longer than `ms` (default 1). Stages taking a
/// `ctx: &FrameContext` also log on every hundredth frame. Without the
/// feature the function is emitted unchanged.
///
/// ```ignore
/// #[profile(2)]
/// pub fn run_controllers(store: &mut AgentStore, ctx: &FrameContext, scratch: &mut SteerScratch) {}
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let has_frame_context = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        let ty = &pat_type.ty;
        pat_ident.ident == "ctx" && quote!(#ty).to_string().contains("FrameContext")
    });

    let guard = if has_frame_context {
        quote! {
            struct StageTimer {
                name: &'static str,
                start: std::time::Instant,
                frame: u64,
            }
            impl Drop for StageTimer {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms || self.frame % 100 == 0 {
                        bevy::prelude::info!("[PERF] {} frame {}: {:?}", self.name, self.frame, elapsed);
                    }
                }
            }
            StageTimer {
                name: #fn_name_str,
                start: std::time::Instant::now(),
                frame: ctx.frame,
            }
        }
    } else {
        quote! {
            struct StageTimer {
                name: &'static str,
                start: std::time::Instant,
            }
            impl Drop for StageTimer {
                fn drop(&mut self) {
                    let elapsed = self.start.elapsed();
                    if elapsed.as_millis() > #threshold_ms {
                        bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                    }
                }
            }
            StageTimer {
                name: #fn_name_str,
                start: std::time::Instant::now(),
            }
        }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _stage_timer = {
                #guard
            };

            #block
        }
    };

    output.into()
}
