/// Registry shared by every chunk of a build through `globalThis.__hyperpack__`. Inlined into
/// user-entry chunks; other chunks expect it to exist already.
pub const RUNTIME: &str = r#"(function () {
  var factories = Object.create(null);
  var cache = Object.create(null);
  var loaded = Object.create(null);
  var externals = Object.create(null);
  var hp = {
    register: function (slot, factory) {
      if (!(slot in factories)) factories[slot] = factory;
    },
    require: function (slot) {
      if (slot in cache) return cache[slot];
      var factory = factories[slot];
      if (!factory) throw new Error("Module " + slot + " is not registered");
      var exports = Object.create(null);
      Object.defineProperty(exports, Symbol.toStringTag, { value: "Module" });
      cache[slot] = exports;
      factory(exports, hp);
      return exports;
    },
    define: function (exports, getters) {
      for (var name in getters) {
        Object.defineProperty(exports, name, { enumerable: true, get: getters[name] });
      }
    },
    star: function (exports, from) {
      Object.keys(from).forEach(function (name) {
        if (name === "default" || Object.prototype.hasOwnProperty.call(exports, name)) return;
        Object.defineProperty(exports, name, {
          enumerable: true,
          get: function () { return from[name]; }
        });
      });
    },
    provide: function (name, value) {
      externals[name] = value;
    },
    external: function (name) {
      if (!(name in externals)) throw new Error("External module " + name + " was not provided");
      return externals[name];
    },
    load: function (files) {
      return Promise.all(files.map(function (file) {
        if (!loaded[file]) {
          loaded[file] = typeof document !== "undefined"
            ? new Promise(function (resolve, reject) {
                var script = document.createElement("script");
                script.src = file;
                script.onload = resolve;
                script.onerror = function () { reject(new Error("Failed to load " + file)); };
                document.head.appendChild(script);
              })
            : import("./" + file);
        }
        return loaded[file];
      }));
    },
    wasm: function (slot, base64) {
      hp.register(slot, function (exports) {
        var bytes = typeof Buffer !== "undefined"
          ? Buffer.from(base64, "base64")
          : Uint8Array.from(atob(base64), function (c) { return c.charCodeAt(0); });
        var instance = new WebAssembly.Instance(new WebAssembly.Module(bytes), {});
        var getters = {};
        Object.keys(instance.exports).forEach(function (name) {
          getters[name] = function () { return instance.exports[name]; };
        });
        hp.define(exports, getters);
      });
    }
  };
  return hp;
})()"#;
